use std::{process, sync::Arc};

use retouch::{
    application::{error::AppError, snapshots::SnapshotService},
    config,
    domain::{edits::Edit, snapshots::SnapshotId},
    infra::{
        blob::S3BlobStore,
        error::InfraError,
        http::{self, HttpState, PreviewCookies},
        telemetry,
    },
};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Inspect(args) => run_inspect(settings, args).await,
    }
}

fn snapshot_service(settings: &config::Settings) -> Arc<SnapshotService> {
    let store = S3BlobStore::new(&settings.storage);
    Arc::new(SnapshotService::new(Arc::new(store)))
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let snapshots = snapshot_service(&settings);
    let cookies = PreviewCookies::new(
        &settings.preview.secret,
        settings.preview.cookie_secure,
        settings.preview.max_age,
    )?;
    let share_body_limit = usize::try_from(settings.share.max_request_bytes.get())
        .map_err(|_| AppError::unexpected("share.max_request_bytes exceeds usize"))?;

    let router = http::build_router(HttpState::new(snapshots, cookies, share_body_limit));

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "retouch::serve",
        addr = %settings.server.addr,
        bucket = %settings.storage.bucket,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    info!(target = "retouch::serve", "server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(
            target = "retouch::serve",
            error = %err,
            "failed to listen for shutdown signal"
        );
        std::future::pending::<()>().await;
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectOutput<'a> {
    snapshot_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
    edits: &'a [Edit],
}

async fn run_inspect(
    settings: config::Settings,
    args: config::InspectArgs,
) -> Result<(), AppError> {
    let id = SnapshotId::parse(&args.snapshot_id)
        .map_err(|err| AppError::unexpected(format!("invalid snapshot id: {err}")))?;
    let snapshot = snapshot_service(&settings).load_snapshot(&id).await?;

    let output = InspectOutput {
        snapshot_id: snapshot.id.as_str(),
        created_at: snapshot
            .created_at
            .and_then(|stamp| stamp.format(&Rfc3339).ok()),
        edits: &snapshot.edits,
    };
    let rendered = serde_json::to_string_pretty(&output)
        .map_err(|err| AppError::unexpected(format!("failed to encode snapshot: {err}")))?;
    println!("{rendered}");
    Ok(())
}
