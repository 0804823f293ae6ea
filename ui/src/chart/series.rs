//! Chart series built from a `getData` response.

use api::DataResponse;
use indexmap::IndexMap;
use serde::Serialize;

use crate::core::model::{Consolidation, PlotType};

/// Name of the synthetic total series and its legend entry.
pub const AGGREGATED: &str = "aggregated";

/// Point values, either spaced by `pointInterval` or carrying their own stamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesData {
    Values(Vec<f64>),
    Stamped(Vec<(i64, f64)>),
}

impl SeriesData {
    pub fn values(&self) -> Vec<f64> {
        match self {
            Self::Values(values) => values.clone(),
            Self::Stamped(points) => points.iter().map(|(_, value)| *value).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSpec {
    pub name: String,
    pub data: SeriesData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_interval: Option<i64>,
    #[serde(rename = "type")]
    pub plot_type: &'static str,
    /// Credits stack apart from charges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<&'static str>,
}

/// Everything needed to (re)draw the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    /// Plotted series; the aggregated total is always last.
    pub series: Vec<SeriesSpec>,
    pub y_axis_title: String,
    /// Prefix of y axis labels and tooltip amounts; empty for usage.
    pub currency_sign: String,
    /// `hour`, `day`, ... shown after every tooltip amount.
    pub unit_name: &'static str,
    pub legend_enabled: bool,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One series per value group, followed by the aggregated total.
///
/// Values are rounded to cents. Groups with no non-zero value are dropped
/// unless `zero_data_valid`.
pub fn build_series(
    response: &DataResponse,
    plot_type: PlotType,
    zero_data_valid: bool,
) -> Vec<SeriesSpec> {
    let stamps = match (response.interval, &response.time) {
        (None, Some(time)) => Some(time.as_slice()),
        _ => None,
    };

    let mut series = Vec::new();
    let mut totals: Vec<f64> = Vec::new();

    for (name, values) in &response.data {
        let rounded: Vec<f64> = values.iter().copied().map(round2).collect();
        let has_data = rounded.iter().any(|value| *value != 0.0);
        if !zero_data_valid && !has_data {
            continue;
        }

        if totals.len() < rounded.len() {
            totals.resize(rounded.len(), 0.0);
        }
        for (total, value) in totals.iter_mut().zip(&rounded) {
            *total += value;
        }

        series.push(SeriesSpec {
            name: name.clone(),
            data: with_stamps(rounded, stamps),
            point_start: response.start,
            point_interval: response.interval,
            plot_type: plot_type.as_str(),
            stack: name.starts_with("Credit").then_some("credit"),
        });
    }

    series.push(SeriesSpec {
        name: AGGREGATED.to_string(),
        data: with_stamps(totals.into_iter().map(round2).collect(), stamps),
        point_start: response.start,
        point_interval: response.interval,
        plot_type: PlotType::Line.as_str(),
        stack: None,
    });
    series
}

fn with_stamps(values: Vec<f64>, stamps: Option<&[i64]>) -> SeriesData {
    match stamps {
        Some(stamps) => SeriesData::Stamped(stamps.iter().copied().zip(values).collect()),
        None => SeriesData::Values(values),
    }
}

/// `Cost per day`, `Usage (ECUs) per hour`, `% Elasticity per day`, ...
pub fn y_axis_title(
    is_cost: bool,
    usage_unit: &str,
    consolidate: Consolidation,
    elasticity: bool,
    tag_coverage: bool,
) -> String {
    let quantity = if elasticity {
        "% Elasticity".to_string()
    } else if tag_coverage {
        "% Tag Coverage".to_string()
    } else if is_cost {
        "Cost".to_string()
    } else if usage_unit.is_empty() {
        "Usage".to_string()
    } else {
        format!("Usage ({usage_unit})")
    };
    format!("{quantity} per {}", consolidate.unit_name())
}

/// `response` with only the groups named in `names`, in that order.
pub fn restrict_to(response: &DataResponse, names: &[String]) -> DataResponse {
    let data: IndexMap<String, Vec<f64>> = names
        .iter()
        .filter_map(|name| {
            response
                .data
                .get(name)
                .map(|values| (name.clone(), values.clone()))
        })
        .collect();
    DataResponse {
        data,
        ..response.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(groups: &[(&str, &[f64])]) -> DataResponse {
        DataResponse {
            status: 200,
            data: groups
                .iter()
                .map(|(name, values)| (name.to_string(), values.to_vec()))
                .collect(),
            start: Some(1_700_000_000_000),
            interval: Some(3_600_000),
            ..DataResponse::default()
        }
    }

    #[test]
    fn drops_all_zero_groups_unless_valid() {
        let data = response(&[("ec2", &[1.234, 0.0]), ("idle", &[0.0, 0.001])]);
        let series = build_series(&data, PlotType::Area, false);
        let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["ec2", AGGREGATED]);
        assert_eq!(series[0].data, SeriesData::Values(vec![1.23, 0.0]));

        let kept = build_series(&data, PlotType::Line, true);
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn credits_stack_separately_and_total_comes_last() {
        let data = response(&[("Recurring", &[2.0, 3.0]), ("Credit", &[-1.0, -0.5])]);
        let series = build_series(&data, PlotType::Column, false);
        assert_eq!(series[0].stack, None);
        assert_eq!(series[1].stack, Some("credit"));
        let total = series.last().map(|s| s.data.values());
        assert_eq!(total, Some(vec![1.0, 2.5]));
    }

    #[test]
    fn explicit_stamps_without_interval() {
        let mut data = response(&[("s3", &[1.0, 2.0])]);
        data.interval = None;
        data.time = Some(vec![10, 20]);
        let series = build_series(&data, PlotType::Line, false);
        assert_eq!(series[0].data, SeriesData::Stamped(vec![(10, 1.0), (20, 2.0)]));
    }

    #[test]
    fn axis_titles() {
        assert_eq!(
            y_axis_title(true, "Instances", Consolidation::Daily, false, false),
            "Cost per day"
        );
        assert_eq!(
            y_axis_title(false, "ECUs", Consolidation::Hourly, false, false),
            "Usage (ECUs) per hour"
        );
        assert_eq!(
            y_axis_title(false, "", Consolidation::Weekly, false, true),
            "% Tag Coverage per week"
        );
        assert_eq!(
            y_axis_title(false, "ECUs", Consolidation::Daily, true, false),
            "% Elasticity per day"
        );
    }

    #[test]
    fn restrict_keeps_requested_order() {
        let data = response(&[("a", &[1.0]), ("b", &[2.0]), ("c", &[3.0])]);
        let restricted = restrict_to(&data, &["c".to_string(), "a".to_string(), "zz".to_string()]);
        let names: Vec<&str> = restricted.data.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["c", "a"]);
    }
}
