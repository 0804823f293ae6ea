//! Chart series, legend interaction and tooltip aggregation on top of an
//! external charting library.

pub mod backend;
#[cfg(target_arch = "wasm32")]
pub mod highcharts;
pub mod legend;
pub mod series;
pub mod summary;
pub mod tooltip;

pub use backend::{ChartBackend, MemoryChart, SeriesInfo};
pub use legend::{Legend, LegendController, SortColumn};
pub use series::{build_series, restrict_to, y_axis_title, ChartSpec, SeriesSpec, AGGREGATED};
pub use summary::{SummaryColumn, SummaryTable};
pub use tooltip::Tooltip;

use api::DataResponse;

use crate::core::state::DashboardState;
use crate::pages::PageConfig;

/// Chart for `response` as the current state and page present it.
pub fn chart_spec(
    response: &DataResponse,
    state: &DashboardState,
    config: &PageConfig,
    currency_sign: &str,
) -> ChartSpec {
    ChartSpec {
        series: build_series(response, state.plot_type, config.zero_data_valid()),
        y_axis_title: y_axis_title(
            state.is_cost(),
            &state.usage_unit,
            state.consolidate,
            config.elasticity,
            config.tag_coverage,
        ),
        currency_sign: state.currency_sign(currency_sign).to_string(),
        unit_name: state.consolidate.unit_name(),
        legend_enabled: config.legend_enabled,
    }
}

/// The chart backend the views draw into.
#[cfg(target_arch = "wasm32")]
pub type PageChart = highcharts::HighchartsChart;
#[cfg(not(target_arch = "wasm32"))]
pub type PageChart = MemoryChart;

pub const CHART_CONTAINER: &str = "highchart_container";

pub fn page_chart() -> PageChart {
    #[cfg(target_arch = "wasm32")]
    {
        highcharts::HighchartsChart::new(CHART_CONTAINER)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        MemoryChart::new()
    }
}
