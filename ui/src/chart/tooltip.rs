//! Shared tooltip: a total line, the largest contributors, and an `other`
//! line for the rest.

use crate::core::{format, timing};

use super::series::AGGREGATED;

/// Series listed individually before the rest is folded into `other`.
pub const LISTED: usize = 26;

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipPoint {
    pub name: String,
    pub color: String,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipLine {
    pub label: String,
    pub color: Option<String>,
    pub amount: f64,
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    /// Formatted time of the hovered points.
    pub header: String,
    pub total: f64,
    /// `aggregated` first, then at most [`LISTED`] series, then `other`.
    pub lines: Vec<TooltipLine>,
}

fn percent_of(value: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        value / total * 100.0
    }
}

impl Tooltip {
    /// Points arrive in chart order; the aggregated total series is skipped.
    pub fn build(x_millis: i64, points: &[TooltipPoint]) -> Self {
        let points: Vec<&TooltipPoint> = points.iter().filter(|p| p.name != AGGREGATED).collect();
        let total: f64 = points.iter().map(|point| point.y).sum();

        let mut lines = vec![TooltipLine {
            label: AGGREGATED.to_string(),
            color: None,
            amount: total,
            percent: None,
        }];
        lines.extend(points.iter().take(LISTED).map(|point| TooltipLine {
            label: point.name.clone(),
            color: Some(point.color.clone()),
            amount: point.y,
            percent: Some(percent_of(point.y, total)),
        }));

        if points.len() > LISTED {
            let other: f64 = points[LISTED..].iter().map(|point| point.y).sum();
            lines.push(TooltipLine {
                label: "other".to_string(),
                color: None,
                amount: other,
                percent: Some(percent_of(other, total)),
            });
        }

        Self {
            header: timing::format_tooltip_millis(x_millis),
            total,
            lines,
        }
    }

    /// `label: <sign><amount> / <unit> (<pct>%)` per line.
    pub fn line_text(line: &TooltipLine, sign: &str, unit: &str) -> String {
        let amount = format::format_amount(sign, line.amount);
        match line.percent {
            Some(percent) => format!(
                "{}: {amount} / {unit} ({}%)",
                line.label,
                format::format_percent(percent)
            ),
            None => format!("{}: {amount} / {unit}", line.label),
        }
    }

    /// Markup handed to the charting library.
    pub fn render_html(&self, sign: &str, unit: &str) -> String {
        let mut html = format!(
            "<span style=\"font-size: x-small;\">{}</span>",
            escape_html(&self.header)
        );
        for line in &self.lines {
            let text = escape_html(&Self::line_text(line, sign, unit));
            match &line.color {
                Some(color) => {
                    html.push_str(&format!("<br/><span style=\"color: {color}\">{text}</span>"))
                }
                None => html.push_str(&format!("<br/><span>{text}</span>")),
            }
        }
        html
    }
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
