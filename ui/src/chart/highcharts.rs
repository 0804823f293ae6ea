//! [`ChartBackend`] over a Highcharts stock chart on the page.
//!
//! Options are assembled as JSON and parsed into a JS object; formatter
//! callbacks are attached afterwards.

use js_sys::{Array, Function, Reflect, JSON};
use serde_json::json;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::backend::{is_internal_series, ChartBackend, SeriesInfo};
use super::series::ChartSpec;
use super::tooltip::{Tooltip, TooltipPoint};

fn get(target: &JsValue, key: &str) -> JsValue {
    Reflect::get(target, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

fn method(target: &JsValue, name: &str) -> Option<Function> {
    get(target, name).dyn_into::<Function>().ok()
}

/// Plotted series, without the ones Highstock adds for its navigator.
fn series_array(chart: &JsValue) -> Vec<JsValue> {
    get(chart, "series")
        .dyn_into::<Array>()
        .map(|series| series.iter().filter(|series| !is_internal(series)).collect())
        .unwrap_or_default()
}

fn is_internal(series: &JsValue) -> bool {
    let options = get(series, "options");
    is_internal_series(
        get(&options, "isInternal").as_bool().unwrap_or(false),
        get(&options, "id").as_string().as_deref(),
    )
}

fn find_series(chart: &JsValue, name: &str) -> Option<JsValue> {
    series_array(chart)
        .into_iter()
        .find(|series| get(series, "name").as_string().as_deref() == Some(name))
}

pub struct HighchartsChart {
    container: String,
    chart: Option<JsValue>,
    // Kept alive for as long as the chart may call it.
    tooltip: Option<Closure<dyn FnMut(JsValue) -> JsValue>>,
}

impl HighchartsChart {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            chart: None,
            tooltip: None,
        }
    }

    fn options(&self, spec: &ChartSpec) -> Result<JsValue, JsValue> {
        let series: Vec<serde_json::Value> = spec
            .series
            .iter()
            .map(|series| serde_json::to_value(series).unwrap_or_default())
            .collect();

        let options = json!({
            "chart": { "zoomType": "x", "spacingRight": 5, "plotBorderWidth": 1 },
            "title": { "style": { "fontSize": "15px" } },
            "time": { "useUTC": true },
            "xAxis": { "type": "datetime" },
            "yAxis": [{ "title": { "text": spec.y_axis_title }, "lineWidth": 2 }],
            "legend": { "enabled": spec.legend_enabled },
            "navigator": { "series": { "showInLegend": false } },
            "rangeSelector": { "enabled": false, "inputEnabled": false },
            "credits": { "enabled": false },
            "plotOptions": {
                "area": { "lineWidth": 1, "stacking": "normal" },
                "column": { "lineWidth": 1, "stacking": "normal" },
                "series": { "states": { "hover": { "lineWidth": 2 } } }
            },
            "tooltip": { "shared": true },
            "series": series,
        });
        JSON::parse(&options.to_string())
    }

    fn attach_formatters(&mut self, options: &JsValue, spec: &ChartSpec) -> Result<(), JsValue> {
        if !spec.currency_sign.is_empty() {
            let sign = serde_json::to_string(&spec.currency_sign).unwrap_or_default();
            let labels = js_sys::Object::new();
            let formatter = Function::new_no_args(&format!("return {sign} + this.value;"));
            Reflect::set(&labels, &"formatter".into(), &formatter)?;
            let axis = get(&get(options, "yAxis"), "0");
            Reflect::set(&axis, &"labels".into(), &labels)?;
        }

        let sign = spec.currency_sign.clone();
        let unit = spec.unit_name;
        let closure = Closure::wrap(Box::new(move |context: JsValue| -> JsValue {
            let x = get(&context, "x").as_f64().unwrap_or_default() as i64;
            let points: Vec<TooltipPoint> = get(&context, "points")
                .dyn_into::<Array>()
                .map(|points| points.iter().collect::<Vec<_>>())
                .unwrap_or_default()
                .iter()
                .map(|point| {
                    let series = get(point, "series");
                    TooltipPoint {
                        name: get(&series, "name").as_string().unwrap_or_default(),
                        color: get(&series, "color").as_string().unwrap_or_default(),
                        y: get(point, "y").as_f64().unwrap_or_default(),
                    }
                })
                .collect();
            JsValue::from_str(&Tooltip::build(x, &points).render_html(&sign, unit))
        }) as Box<dyn FnMut(JsValue) -> JsValue>);

        // Highcharts passes the hovered points as `this`.
        let shim = Function::new_with_args("fmt", "return function () { return fmt(this); };");
        let formatter = shim.call1(&JsValue::NULL, closure.as_ref().unchecked_ref())?;
        Reflect::set(&get(options, "tooltip"), &"formatter".into(), &formatter)?;
        self.tooltip = Some(closure);
        Ok(())
    }

    fn try_render(&mut self, spec: &ChartSpec) -> Result<(), JsValue> {
        let options = self.options(spec)?;
        self.attach_formatters(&options, spec)?;

        let highcharts = get(&js_sys::global(), "Highcharts");
        let stock_chart =
            method(&highcharts, "stockChart").ok_or_else(|| JsValue::from_str("Highcharts missing"))?;
        if let Some(previous) = self.chart.take() {
            if let Some(destroy) = method(&previous, "destroy") {
                let _ = destroy.call0(&previous);
            }
        }
        let chart = stock_chart.call2(&highcharts, &JsValue::from_str(&self.container), &options)?;
        self.chart = Some(chart);
        Ok(())
    }
}

impl ChartBackend for HighchartsChart {
    fn render(&mut self, spec: &ChartSpec) {
        if let Err(err) = self.try_render(spec) {
            warn!(?err, container = %self.container, "chart render failed");
        }
    }

    fn series(&self) -> Vec<SeriesInfo> {
        let Some(chart) = &self.chart else {
            return Vec::new();
        };
        series_array(chart)
            .iter()
            .map(|series| SeriesInfo {
                name: get(series, "name").as_string().unwrap_or_default(),
                color: get(series, "color").as_string().unwrap_or_default(),
                visible: get(series, "visible").as_bool().unwrap_or(true),
                y_axis: get(&get(&get(series, "yAxis"), "options"), "index")
                    .as_f64()
                    .unwrap_or_default() as usize,
            })
            .collect()
    }

    fn set_visible(&mut self, name: &str, visible: bool, redraw: bool) -> bool {
        let Some(series) = self.chart.as_ref().and_then(|chart| find_series(chart, name)) else {
            return false;
        };
        if let Some(set_visible) = method(&series, "setVisible") {
            let _ = set_visible.call2(&series, &JsValue::from_bool(visible), &JsValue::from_bool(redraw));
        }
        true
    }

    fn set_position(&mut self, name: &str, position: usize) {
        let Some(series) = self.chart.as_ref().and_then(|chart| find_series(chart, name)) else {
            return;
        };
        let update = js_sys::Object::new();
        if Reflect::set(&update, &"index".into(), &JsValue::from_f64(position as f64)).is_err() {
            return;
        }
        if let Some(apply) = method(&series, "update") {
            let _ = apply.call2(&series, &update, &JsValue::FALSE);
        }
    }

    fn redraw(&mut self) {
        if let Some(chart) = &self.chart {
            if let Some(redraw) = method(chart, "redraw") {
                let _ = redraw.call0(chart);
            }
        }
    }
}
