//! Request/response contracts for the billing backend consumed by the dashboard.
//!
//! The UI never talks HTTP directly; it goes through the [`Backend`] trait so the
//! dimension cascade can be driven by a fake in tests and by [`HttpBackend`] in
//! the browser.

mod backend;
mod error;
mod http;
mod params;
mod types;

pub use backend::{AdminEndpoint, Backend, ItemEndpoint, OpsEndpoint};
pub use error::{ApiError, ErrorKind};
pub use http::HttpBackend;
pub use params::{ParamValue, QueryParams};
pub use types::{DataResponse, Envelope, Item, SeriesStats, TimeSpan};
