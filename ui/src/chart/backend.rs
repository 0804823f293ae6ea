//! The narrow surface the legend controller needs from a charting library.

use super::series::ChartSpec;

/// A plotted series as the chart currently shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesInfo {
    pub name: String,
    pub color: String,
    pub visible: bool,
    /// Index of the y axis the series is drawn against.
    pub y_axis: usize,
}

/// Series are addressed by name; positions shift when they are reordered.
pub trait ChartBackend {
    /// Replaces the chart with one drawn from `spec`.
    fn render(&mut self, spec: &ChartSpec);

    /// Plotted series in display order, the aggregated total last.
    fn series(&self) -> Vec<SeriesInfo>;

    /// Returns false when no series carries `name`.
    fn set_visible(&mut self, name: &str, visible: bool, redraw: bool) -> bool;

    /// Explicit display position; takes effect on the next redraw.
    fn set_position(&mut self, name: &str, position: usize);

    fn redraw(&mut self);
}

/// Id prefix Highstock gives the series drawn inside its navigator.
pub const NAVIGATOR_ID: &str = "highcharts-navigator-series";

/// Whether a series reported by the charting library belongs to the library
/// itself rather than to the plotted data.
pub fn is_internal_series(internal: bool, id: Option<&str>) -> bool {
    internal || id.is_some_and(|id| id.starts_with(NAVIGATOR_ID))
}

/// Default colour cycle of the charting library.
pub const PALETTE: [&str; 10] = [
    "#7cb5ec", "#434348", "#90ed7d", "#f7a35c", "#8085e9", "#f15c80", "#e4d354", "#2b908f",
    "#f45b5b", "#91e8e1",
];

#[derive(Debug, Clone, PartialEq)]
struct MemorySeries {
    info: SeriesInfo,
    position: usize,
}

/// Chart kept entirely in memory; renders nothing and counts redraws.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryChart {
    series: Vec<MemorySeries>,
    pub redraws: usize,
    pub renders: usize,
}

impl MemoryChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves a series to another y axis.
    pub fn set_y_axis(&mut self, name: &str, axis: usize) {
        if let Some(series) = self.series.iter_mut().find(|s| s.info.name == name) {
            series.info.y_axis = axis;
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.series().into_iter().map(|info| info.name).collect()
    }
}

impl ChartBackend for MemoryChart {
    fn render(&mut self, spec: &ChartSpec) {
        self.series = spec
            .series
            .iter()
            .enumerate()
            .map(|(position, series)| MemorySeries {
                info: SeriesInfo {
                    name: series.name.clone(),
                    color: PALETTE[position % PALETTE.len()].to_string(),
                    visible: true,
                    y_axis: 0,
                },
                position,
            })
            .collect();
        self.renders += 1;
    }

    fn series(&self) -> Vec<SeriesInfo> {
        let mut ordered: Vec<&MemorySeries> = self.series.iter().collect();
        ordered.sort_by_key(|series| series.position);
        ordered.into_iter().map(|series| series.info.clone()).collect()
    }

    fn set_visible(&mut self, name: &str, visible: bool, redraw: bool) -> bool {
        let Some(series) = self.series.iter_mut().find(|s| s.info.name == name) else {
            return false;
        };
        series.info.visible = visible;
        if redraw {
            self.redraw();
        }
        true
    }

    fn set_position(&mut self, name: &str, position: usize) {
        if let Some(series) = self.series.iter_mut().find(|s| s.info.name == name) {
            series.position = position;
        }
    }

    fn redraw(&mut self) {
        self.redraws += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigator_series_is_internal() {
        assert!(is_internal_series(true, None));
        assert!(is_internal_series(false, Some("highcharts-navigator-series")));
        assert!(is_internal_series(false, Some("highcharts-navigator-series-1")));
        assert!(!is_internal_series(false, None));
        assert!(!is_internal_series(false, Some("aggregated")));
    }

    #[test]
    fn memory_chart_reports_only_rendered_series() {
        let mut chart = MemoryChart::new();
        chart.render(&ChartSpec {
            series: Vec::new(),
            y_axis_title: String::new(),
            currency_sign: String::new(),
            unit_name: "day",
            legend_enabled: true,
        });
        assert!(chart.series().is_empty());
        assert!(!chart.set_visible("Navigator 1", false, true));
        assert_eq!(chart.redraws, 0);
    }
}
