//! Shared UI crate for the Ice dashboard: pure dashboard logic in `core`,
//! the chart layer, page presets and the Dioxus views.

pub mod chart;
pub mod core;
pub mod pages;
pub mod views;

pub mod components {
    pub mod app_navbar;
    pub use app_navbar::AppNavbar;
}
