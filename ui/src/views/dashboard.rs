use api::{ApiError, Backend, HttpBackend};
use dioxus::prelude::*;
use futures_util::StreamExt;
use tracing::{debug, info};

use crate::chart::{self, restrict_to, LegendController, PageChart, SummaryTable, CHART_CONTAINER};
use crate::components::AppNavbar;
use crate::core::config::AppConfig;
use crate::core::errors::ErrorAction;
use crate::core::events::{self, DashboardEvent, Effect};
use crate::core::query::{self, DownloadForm};
use crate::core::resolver::{CascadeStart, Resolver};
use crate::core::state::DashboardState;
use crate::core::{platform, timing, url_state};
use crate::pages::{self, PageKind};

use super::controls::ControlsPanel;
use super::legend::LegendPanel;
use super::summary::SummaryPanel;

/// One dashboard page: controls, chart, legend and (on the summary page) the
/// monthly table.
#[component]
pub fn Dashboard(page: PageKind) -> Element {
    let backend = use_hook(super::connect);
    let state =
        use_signal(|| pages::initial_state(page, &platform::location_hash(), timing::now()));
    let legend = use_signal(|| LegendController::new(chart::page_chart()));
    let summary = use_signal(|| Option::<SummaryTable>::None);
    let loading = use_signal(|| false);
    let error = use_signal(|| Option::<String>::None);

    // The fragment always mirrors the state.
    use_effect(move || {
        let fragment = url_state::encode(&state.read());
        platform::replace_hash(&fragment);
    });

    let connected = backend.clone();
    use_coroutine(move |mut rx: UnboundedReceiver<DashboardEvent>| {
        let backend = connected.clone();
        let mut state = state;
        let mut error = error;

        async move {
            let backend = match backend {
                Ok(backend) => backend,
                Err(err) => {
                    ErrorAction::classify(&err).perform(|message| error.set(Some(message)));
                    return;
                }
            };

            spawn_bootstrap(backend.clone(), state, legend, summary, loading, error);

            while let Some(event) = rx.next().await {
                debug!(?event, "dashboard event");
                error.set(None);
                let effect = state.with_mut(|s| events::apply(s, event));
                match effect {
                    Effect::None => {}
                    Effect::Cascade(start) => spawn_cascade(backend.clone(), state, error, start),
                    Effect::ReloadOps => {
                        let backend = backend.clone();
                        spawn(async move {
                            if let Err(err) = pages::reservation_sharing_changed(&backend, &state).await {
                                report(&err, error);
                            }
                        });
                    }
                    Effect::Query => spawn_query(backend.clone(), state, legend, summary, loading, error),
                    Effect::Download => download(&state.read(), error),
                }
            }
        }
    });

    let snapshot = state.read();
    let time_link = snapshot.time_link();
    let graph_only = snapshot.graph_only;
    let legend_enabled = page.config().legend_enabled;
    drop(snapshot);

    let sign = AppConfig::global().currency_sign.clone();
    let connection_error = backend.as_ref().err().map(ToString::to_string);

    rsx! {
        AppNavbar { current: page, time_link }

        section { class: "page dashboard",
            if !graph_only {
                h1 { class: "dashboard__title", "{page.title()}" }
                ControlsPanel { state, loading }
            }

            {connection_error.or_else(|| error()).map(|message| rsx! {
                div { class: "dashboard__error", "{message}" }
            })}
            if loading() {
                div { class: "dashboard__loading", "Loading…" }
            }

            if page == PageKind::Summary {
                SummaryPanel { summary, legend, currency_sign: sign.clone() }
            }

            div { id: CHART_CONTAINER, class: "dashboard__chart" }

            if legend_enabled {
                LegendPanel { legend, currency_sign: sign }
            }
        }
    }
}

fn report(err: &ApiError, mut error: Signal<Option<String>>) {
    ErrorAction::classify(err).perform(|message| error.set(Some(message)));
}

fn spawn_cascade(
    backend: HttpBackend,
    state: Signal<DashboardState>,
    error: Signal<Option<String>>,
    start: CascadeStart,
) {
    spawn(async move {
        if let Err(err) = Resolver::new(&backend, &state).run(start).await {
            report(&err, error);
        }
    });
}

/// Time span, operation lists and the first cascade, then the first query.
fn spawn_bootstrap(
    backend: HttpBackend,
    state: Signal<DashboardState>,
    legend: Signal<LegendController<PageChart>>,
    summary: Signal<Option<SummaryTable>>,
    mut loading: Signal<bool>,
    error: Signal<Option<String>>,
) {
    spawn(async move {
        loading.set(true);
        let result = match pages::bootstrap(&backend, &state).await {
            Ok(_) => fetch_data(&backend, state, legend, summary).await,
            Err(err) => Err(err),
        };
        loading.set(false);
        if let Err(err) = result {
            report(&err, error);
        }
    });
}

fn spawn_query(
    backend: HttpBackend,
    state: Signal<DashboardState>,
    legend: Signal<LegendController<PageChart>>,
    summary: Signal<Option<SummaryTable>>,
    mut loading: Signal<bool>,
    error: Signal<Option<String>>,
) {
    spawn(async move {
        loading.set(true);
        let result = fetch_data(&backend, state, legend, summary).await;
        loading.set(false);
        if let Err(err) = result {
            report(&err, error);
        }
    });
}

/// Runs the page's data query and redraws. The summary page first fetches
/// its monthly table and orders the chart after it.
async fn fetch_data<B: Backend>(
    backend: &B,
    state: Signal<DashboardState>,
    mut legend: Signal<LegendController<PageChart>>,
    mut summary: Signal<Option<SummaryTable>>,
) -> Result<(), ApiError> {
    let snapshot = state.read().clone();
    let config = snapshot.page.config();
    let sign = AppConfig::global().currency_sign.clone();
    let page_query = pages::data_query(&snapshot);

    if snapshot.page != PageKind::Summary {
        let response = backend.data(&query::data_params(&snapshot, &page_query)).await?;
        info!(groups = response.data.len(), "data loaded");
        let spec = chart::chart_spec(&response, &snapshot, &config, &sign);
        legend.with_mut(|controller| controller.draw(&spec, &response.stats));
        return Ok(());
    }

    let (table_query, chart_query) = pages::summary_queries();
    let mut table_params = page_query.clone();
    table_params.merge(&table_query);
    let monthly = backend.data(&query::data_params(&snapshot, &table_params)).await?;
    let table = SummaryTable::from_response(&monthly, timing::now_millis());
    let order = table.names();
    summary.set(Some(table));

    let mut chart_params = page_query;
    chart_params.merge(&chart_query);
    let daily = backend.data(&query::data_params(&snapshot, &chart_params)).await?;
    let daily = restrict_to(&daily, &order);
    let spec = chart::chart_spec(&daily, &snapshot, &config, &sign);
    legend.with_mut(|controller| {
        controller.draw(&spec, &daily.stats);
        controller.reorder(&order);
    });
    Ok(())
}

fn download(state: &DashboardState, mut error: Signal<Option<String>>) {
    let params = query::data_params(state, &pages::data_query(state));
    let action = AppConfig::global().download_action(&platform::origin());
    if let Err(message) = platform::submit_download_form(&DownloadForm::new(action, &params)) {
        error.set(Some(message));
    }
}
