//! Preview cookie handling.
//!
//! The cookie is encrypted and authenticated by `PrivateCookieJar`, so a
//! client can neither read nor forge the snapshot id it carries.

use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use sha2::{Digest, Sha512};
use tracing::debug;

use crate::application::preview::PreviewSession;
use crate::config::MIN_PREVIEW_SECRET_BYTES;
use crate::domain::snapshots::SnapshotId;
use crate::infra::error::InfraError;

pub const PREVIEW_COOKIE: &str = "retouch_preview";

#[derive(Clone)]
pub struct PreviewCookies {
    key: Key,
    secure: bool,
    max_age: Duration,
}

impl PreviewCookies {
    /// Derive the jar key from `secret`. Any secret length maps onto the 64
    /// bytes of key material the jar needs.
    pub fn new(secret: &str, secure: bool, max_age: Duration) -> Result<Self, InfraError> {
        if secret.len() < MIN_PREVIEW_SECRET_BYTES {
            return Err(InfraError::configuration(format!(
                "preview secret must be at least {MIN_PREVIEW_SECRET_BYTES} bytes"
            )));
        }

        let digest = Sha512::digest(secret.as_bytes());
        let key = Key::try_from(&digest[..])
            .map_err(|err| InfraError::configuration(format!("invalid preview key: {err}")))?;

        Ok(Self {
            key,
            secure,
            max_age,
        })
    }

    pub fn key(&self) -> Key {
        self.key.clone()
    }

    /// Returns `None` when the cookie is absent, fails authentication, or
    /// carries something that is not a snapshot id.
    pub fn read(&self, jar: &PrivateCookieJar) -> Option<PreviewSession> {
        let cookie = jar.get(PREVIEW_COOKIE)?;
        match SnapshotId::parse(cookie.value()) {
            Ok(snapshot_id) => Some(PreviewSession { snapshot_id }),
            Err(err) => {
                debug!(
                    target = "retouch::infra::http::session",
                    error = %err,
                    "ignoring preview cookie with invalid id"
                );
                None
            }
        }
    }

    pub fn store(&self, jar: PrivateCookieJar, session: &PreviewSession) -> PrivateCookieJar {
        let max_age = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);
        let cookie = Cookie::build((PREVIEW_COOKIE, session.snapshot_id.as_str().to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::seconds(max_age));
        jar.add(cookie)
    }

    pub fn clear(&self, jar: PrivateCookieJar) -> PrivateCookieJar {
        jar.remove(Cookie::build(PREVIEW_COOKIE).path("/"))
    }
}
