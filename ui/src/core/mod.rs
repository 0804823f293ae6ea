//! Pure dashboard logic: selection state, URL codec, cascade and queries.

pub mod config;
pub mod errors;
pub mod events;
pub mod filter;
pub mod format;
pub mod model;
pub mod platform;
pub mod query;
pub mod resolver;
pub mod state;
pub mod timing;
pub mod url_state;
