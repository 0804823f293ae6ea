//! Legend entries and the interactions that keep them in step with the chart.

use std::cmp::Ordering;

use api::SeriesStats;
use indexmap::IndexMap;
use tracing::debug;

use super::backend::ChartBackend;
use super::series::{ChartSpec, AGGREGATED};

/// Colour of hidden series in the legend.
pub const DISABLED_COLOR: &str = "rgb(192, 192, 192)";

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub name: String,
    pub style: String,
    pub icon_style: String,
    pub color: String,
    pub stats: Option<SeriesStats>,
}

impl Legend {
    fn new(name: &str, color: &str, stats: Option<SeriesStats>) -> Self {
        let mut legend = Self {
            name: name.to_string(),
            style: String::new(),
            icon_style: String::new(),
            color: color.to_string(),
            stats,
        };
        legend.set_shown(true);
        legend
    }

    pub fn is_aggregated(&self) -> bool {
        self.name == AGGREGATED
    }

    pub fn is_shown(&self) -> bool {
        self.style == format!("color: {}", self.color)
    }

    fn set_shown(&mut self, shown: bool) {
        let color = if shown { self.color.as_str() } else { DISABLED_COLOR };
        self.style = format!("color: {color}");
        self.icon_style = format!("background-color: {color}");
    }

    fn stat(&self, key: &str) -> f64 {
        self.stats
            .as_ref()
            .and_then(|stats| stats.get(key))
            .copied()
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    /// A key of the per-series stats (`total`, `average`, ...).
    Stat(String),
}

/// Last sort column and direction.
///
/// A new name column starts ascending, a new numeric column descending; the
/// same column again flips the direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState<C> {
    pub column: Option<C>,
    pub descending: bool,
}

impl<C> Default for SortState<C> {
    fn default() -> Self {
        Self {
            column: None,
            descending: false,
        }
    }
}

impl<C: PartialEq> SortState<C> {
    pub fn select(&mut self, column: C, is_name: bool) {
        if self.column.as_ref() == Some(&column) {
            self.descending = !self.descending;
        } else {
            self.descending = !is_name;
            self.column = Some(column);
        }
    }

    pub fn apply(&self, ordering: Ordering) -> Ordering {
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// Owns a chart and its legend entries.
pub struct LegendController<C> {
    chart: C,
    legends: Vec<Legend>,
    sort: SortState<SortColumn>,
}

impl<C: ChartBackend> LegendController<C> {
    pub fn new(chart: C) -> Self {
        Self {
            chart,
            legends: Vec::new(),
            sort: SortState::default(),
        }
    }

    pub fn chart(&self) -> &C {
        &self.chart
    }

    pub fn chart_mut(&mut self) -> &mut C {
        &mut self.chart
    }

    pub fn legends(&self) -> &[Legend] {
        &self.legends
    }

    /// Renders `spec` and rebuilds the legend: `aggregated` first, then one
    /// entry per plotted series with its stats.
    pub fn draw(&mut self, spec: &ChartSpec, stats: &IndexMap<String, SeriesStats>) {
        self.chart.render(spec);

        let mut legends = vec![Legend::new(
            AGGREGATED,
            "",
            stats.get(AGGREGATED).cloned(),
        )];
        legends.extend(
            self.chart
                .series()
                .into_iter()
                .filter(|series| series.name != AGGREGATED)
                .map(|series| Legend::new(&series.name, &series.color, stats.get(&series.name).cloned())),
        );
        self.legends = legends;
        self.sort = SortState::default();
    }

    /// Flips the visibility of the series behind `name`.
    pub fn toggle(&mut self, name: &str) {
        if name == AGGREGATED {
            return;
        }
        let Some(series) = self.chart.series().into_iter().find(|s| s.name == name) else {
            debug!(name, "legend entry without a series");
            return;
        };
        self.chart.set_visible(name, !series.visible, true);
        if let Some(legend) = self.legends.iter_mut().find(|l| l.name == name) {
            legend.set_shown(!series.visible);
        }
    }

    pub fn show_all(&mut self) {
        for series in self.chart.series() {
            self.chart.set_visible(&series.name, true, false);
        }
        self.chart.redraw();
        for legend in &mut self.legends {
            legend.set_shown(true);
        }
    }

    /// Hides every primary-axis series except the aggregated total.
    pub fn hide_all(&mut self) {
        for series in self.chart.series() {
            if series.name != AGGREGATED && series.y_axis == 0 {
                self.chart.set_visible(&series.name, false, false);
            }
        }
        self.chart.redraw();
        self.sync_shown();
    }

    /// Greys exactly the entries whose series is hidden.
    fn sync_shown(&mut self) {
        let series = self.chart.series();
        for legend in &mut self.legends {
            let visible = legend.is_aggregated()
                || series
                    .iter()
                    .find(|s| s.name == legend.name)
                    .map_or(true, |s| s.visible);
            legend.set_shown(visible);
        }
    }

    /// Moves the named series to the front in the given order; series not
    /// named keep their relative order after them.
    pub fn reorder<S: AsRef<str>>(&mut self, order: &[S]) {
        let current: Vec<String> = self
            .chart
            .series()
            .into_iter()
            .map(|series| series.name)
            .filter(|name| name != AGGREGATED)
            .collect();

        let mut placed: Vec<&str> = Vec::with_capacity(current.len());
        for name in order {
            let name: &str = name.as_ref();
            if name != AGGREGATED && current.iter().any(|c| c == name) && !placed.contains(&name) {
                placed.push(name);
            }
        }
        for name in &current {
            if !placed.contains(&name.as_str()) {
                placed.push(name);
            }
        }

        for (position, name) in placed.iter().enumerate() {
            self.chart.set_position(name, position);
        }
        self.chart.redraw();
    }

    /// Sorts the legend by `column` and reorders the chart to match, with
    /// `aggregated` pinned first.
    pub fn sort_legends(&mut self, column: SortColumn) {
        let is_name = column == SortColumn::Name;
        self.sort.select(column, is_name);

        let (mut pinned, mut rest): (Vec<Legend>, Vec<Legend>) = self
            .legends
            .drain(..)
            .partition(Legend::is_aggregated);

        let sort = &self.sort;
        rest.sort_by(|a, b| {
            let ordering = match &sort.column {
                Some(SortColumn::Stat(key)) => a
                    .stat(key)
                    .partial_cmp(&b.stat(key))
                    .unwrap_or(Ordering::Equal),
                _ => a.name.cmp(&b.name),
            };
            sort.apply(ordering)
        });

        pinned.append(&mut rest);
        self.legends = pinned;

        let order: Vec<String> = self.legends.iter().map(|l| l.name.clone()).collect();
        self.reorder(&order);
    }
}
