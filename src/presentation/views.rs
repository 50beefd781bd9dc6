use crate::application::error::HttpError;
use crate::application::preview::{RenderMode, RenderedPage};
use crate::domain::page::{FEATURE_CARDS, PageContent};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "retouch::presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

#[derive(Clone, Debug)]
pub struct RegionView {
    pub field_id: &'static str,
    pub text: String,
    pub overridden: bool,
}

impl RegionView {
    fn from_content(content: &PageContent, field_id: &'static str) -> Self {
        Self {
            field_id,
            text: content.text(field_id).to_string(),
            overridden: content.is_overridden(field_id),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FeatureCardView {
    pub heading: RegionView,
    pub body: RegionView,
}

/// Everything `page.html` needs, flattened out of a `RenderedPage`.
#[derive(Clone, Debug)]
pub struct PageView {
    pub title: RegionView,
    pub tagline: RegionView,
    pub intro: RegionView,
    pub features: Vec<FeatureCardView>,
    pub cta: RegionView,
    /// Set while previewing a snapshot that loaded.
    pub preview_id: Option<String>,
    /// Set when a preview was requested but could not be shown.
    pub banner: Option<&'static str>,
    /// Editing is offered only on the live page.
    pub editable: bool,
}

impl From<RenderedPage> for PageView {
    fn from(page: RenderedPage) -> Self {
        let banner = page.banner();
        let content = &page.content;
        let preview_id = match &page.mode {
            RenderMode::Preview { snapshot_id } => Some(snapshot_id.as_str().to_string()),
            RenderMode::Normal | RenderMode::Degraded { .. } => None,
        };

        Self {
            title: RegionView::from_content(content, "title"),
            tagline: RegionView::from_content(content, "tagline"),
            intro: RegionView::from_content(content, "intro"),
            features: FEATURE_CARDS
                .iter()
                .map(|(heading, body)| FeatureCardView {
                    heading: RegionView::from_content(content, heading),
                    body: RegionView::from_content(content, body),
                })
                .collect(),
            cta: RegionView::from_content(content, "cta"),
            editable: matches!(page.mode, RenderMode::Normal),
            preview_id,
            banner,
        }
    }
}

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub view: PageView,
}
