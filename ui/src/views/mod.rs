mod controls;
mod dashboard;
mod legend;
mod resource;
mod summary;

pub use dashboard::Dashboard;
pub use resource::{ResourceInfo, ResourceView};

use api::{ApiError, HttpBackend};

use crate::core::config::AppConfig;
use crate::core::platform;

/// Client for the configured API base on this page's origin.
fn connect() -> Result<HttpBackend, ApiError> {
    HttpBackend::new(&AppConfig::global().resolved_api_base(&platform::origin()))
}
