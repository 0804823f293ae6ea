use dioxus::logger::tracing::{info, Level};
use dioxus::prelude::*;

use ui::pages::PageKind;
use ui::views::{Dashboard, ResourceInfo};

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[route("/")]
    Detail {},
    #[route("/reservation")]
    Reservation {},
    #[route("/savingsplans")]
    SavingsPlans {},
    #[route("/utilization")]
    Utilization {},
    #[route("/tagcoverage")]
    TagCoverage {},
    #[route("/summary")]
    Summary {},
    #[route("/resource/:id")]
    Resource { id: String },
}

const HIGHSTOCK: &str = "https://code.highcharts.com/stock/highstock.js";

fn main() {
    if let Err(err) = dioxus::logger::init(Level::INFO) {
        eprintln!("logger init failed: {err}");
    }
    info!("starting dashboard");
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        document::Script { src: HIGHSTOCK }
        Router::<Route> {}
    }
}

#[component]
fn Detail() -> Element {
    rsx! { Dashboard { page: PageKind::Detail } }
}

#[component]
fn Reservation() -> Element {
    rsx! { Dashboard { page: PageKind::Reservation } }
}

#[component]
fn SavingsPlans() -> Element {
    rsx! { Dashboard { page: PageKind::SavingsPlans } }
}

#[component]
fn Utilization() -> Element {
    rsx! { Dashboard { page: PageKind::Utilization } }
}

#[component]
fn TagCoverage() -> Element {
    rsx! { Dashboard { page: PageKind::TagCoverage } }
}

#[component]
fn Summary() -> Element {
    rsx! { Dashboard { page: PageKind::Summary } }
}

#[component]
fn Resource(id: String) -> Element {
    rsx! { ResourceInfo { id } }
}
