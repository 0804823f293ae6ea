//! What a view does with a failed request.

use api::{ApiError, ErrorKind};
use tracing::warn;

use super::platform;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorAction {
    /// Session gone; reload the whole page.
    Reload,
    /// Message shown next to the control that failed.
    Inline(String),
}

impl ErrorAction {
    pub fn classify(err: &ApiError) -> Self {
        match err.kind() {
            ErrorKind::AuthExpired => Self::Reload,
            _ => Self::Inline(status_message(err)),
        }
    }

    /// Classification for a single resource lookup by `id`.
    pub fn for_resource(id: &str, err: &ApiError) -> Self {
        match err.kind() {
            ErrorKind::AuthExpired => Self::Reload,
            ErrorKind::NotFound => Self::Inline(format!("Resource {id} does not exist.")),
            ErrorKind::Generic => Self::Inline(format!(
                "Error getting resource {id}: {}",
                err.status()
                    .map(|status| status.to_string())
                    .unwrap_or_else(|| err.to_string())
            )),
        }
    }

    /// Reloads, or hands the message to `show`.
    pub fn perform(self, show: impl FnOnce(String)) {
        match self {
            Self::Reload => {
                warn!("session expired, reloading");
                platform::reload();
            }
            Self::Inline(message) => show(message),
        }
    }
}

fn status_message(err: &ApiError) -> String {
    match err.status() {
        Some(status) => format!("Error: {status}"),
        None => err.to_string(),
    }
}
