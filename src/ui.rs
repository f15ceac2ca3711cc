use std::path::Path;

use anyhow::Context;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;
use tower_http::services::ServeDir;

use crate::error::ApiError;

/// The three registration page variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Form,
    Forbidden,
    Success,
}

impl Page {
    pub const ALL: [Self; 3] = [Self::Form, Self::Forbidden, Self::Success];

    pub fn template_name(self) -> &'static str {
        match self {
            Self::Form => "register.html",
            Self::Forbidden => "register-forbidden.html",
            Self::Success => "register-success.html",
        }
    }
}

/// How a page message should be styled. Renders as `""`, `"error"` or `"success"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Severity {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "success")]
    Success,
}

/// Values substituted into a page template.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageData {
    pub message: String,
    pub message_type: Severity,
}

impl PageData {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            message_type: Severity::Error,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            message_type: Severity::Success,
        }
    }
}

/// Pre-compiled page templates, loaded once at startup.
///
/// Template names end in `.html`, so minijinja auto-escapes `message`.
pub struct Pages {
    env: minijinja::Environment<'static>,
}

impl Pages {
    /// Load every page template from `dir`. Any missing or invalid file is an error.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let mut sources = Vec::with_capacity(Page::ALL.len());
        for page in Page::ALL {
            let path = dir.join(page.template_name());
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read template {}", path.display()))?;
            sources.push((page, source));
        }
        let pages = Self::from_sources(sources)?;
        tracing::info!(dir = %dir.display(), "page templates loaded");
        Ok(pages)
    }

    pub fn from_sources(sources: impl IntoIterator<Item = (Page, String)>) -> anyhow::Result<Self> {
        let mut env = minijinja::Environment::new();
        for (page, source) in sources {
            env.add_template_owned(page.template_name(), source)
                .with_context(|| format!("failed to parse template {}", page.template_name()))?;
        }
        for page in Page::ALL {
            env.get_template(page.template_name())
                .with_context(|| format!("missing template {}", page.template_name()))?;
        }
        Ok(Self { env })
    }

    pub fn render(&self, page: Page, data: &PageData) -> Result<String, minijinja::Error> {
        self.env.get_template(page.template_name())?.render(data)
    }

    /// Render `page` as an HTML response with `status`.
    pub fn respond(&self, status: StatusCode, page: Page, data: &PageData) -> Response {
        match self.render(page, data) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => ApiError::Internal(
                anyhow::Error::new(e).context(format!("failed to render {}", page.template_name())),
            )
            .into_response(),
        }
    }
}

/// File service for the static asset directory.
pub fn static_files(dir: &Path) -> ServeDir {
    ServeDir::new(dir)
}
