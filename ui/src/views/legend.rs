use dioxus::prelude::*;

use crate::chart::legend::Legend;
use crate::chart::{LegendController, PageChart, SortColumn};
use crate::core::format;

/// Stats columns present on any legend entry, in key order.
fn stat_columns(legends: &[Legend]) -> Vec<String> {
    let mut columns: Vec<String> = legends
        .iter()
        .filter_map(|legend| legend.stats.as_ref())
        .flat_map(|stats| stats.keys().cloned())
        .collect();
    columns.sort();
    columns.dedup();
    columns
}

#[component]
pub fn LegendPanel(legend: Signal<LegendController<PageChart>>, currency_sign: String) -> Element {
    let legends = legend.read().legends().to_vec();
    let columns = stat_columns(&legends);
    let mut legend = legend;

    rsx! {
        section { class: "legend",
            div { class: "legend__actions",
                button {
                    r#type: "button",
                    onclick: move |_| legend.with_mut(|controller| controller.show_all()),
                    "Show all"
                }
                button {
                    r#type: "button",
                    onclick: move |_| legend.with_mut(|controller| controller.hide_all()),
                    "Hide all"
                }
            }
            table { class: "legend__table",
                thead {
                    tr {
                        th {
                            class: "legend__sortable",
                            onclick: move |_| legend.with_mut(|controller| controller.sort_legends(SortColumn::Name)),
                            "Name"
                        }
                        for column in columns.iter().cloned() {
                            {render_header(column, legend)}
                        }
                    }
                }
                tbody {
                    for entry in legends.into_iter() {
                        {render_entry(entry, &columns, &currency_sign, legend)}
                    }
                }
            }
        }
    }
}

fn render_header(column: String, mut legend: Signal<LegendController<PageChart>>) -> Element {
    let label = column.clone();
    rsx! {
        th {
            key: "{label}",
            class: "legend__sortable",
            onclick: move |_| {
                let column = SortColumn::Stat(column.clone());
                legend.with_mut(|controller| controller.sort_legends(column));
            },
            "{label}"
        }
    }
}

fn render_entry(
    entry: Legend,
    columns: &[String],
    sign: &str,
    mut legend: Signal<LegendController<PageChart>>,
) -> Element {
    let values: Vec<String> = columns
        .iter()
        .map(|column| {
            entry
                .stats
                .as_ref()
                .and_then(|stats| stats.get(column))
                .map(|value| format::format_amount(sign, *value))
                .unwrap_or_default()
        })
        .collect();
    let name = entry.name.clone();

    rsx! {
        tr {
            key: "{entry.name}",
            class: "legend__entry",
            style: "{entry.style}",
            onclick: move |_| legend.with_mut(|controller| controller.toggle(&name)),
            td {
                span { class: "legend__icon", style: "{entry.icon_style}" }
                "{entry.name}"
            }
            for (index, value) in values.iter().enumerate() {
                td { key: "{index}", class: "legend__value", "{value}" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::SeriesStats;

    #[test]
    fn columns_union_across_entries() {
        let mut first = SeriesStats::new();
        first.insert("total".into(), 1.0);
        let mut second = SeriesStats::new();
        second.insert("average".into(), 2.0);
        second.insert("total".into(), 3.0);

        let legends = vec![
            Legend {
                name: "a".into(),
                style: String::new(),
                icon_style: String::new(),
                color: String::new(),
                stats: Some(first),
            },
            Legend {
                name: "b".into(),
                style: String::new(),
                icon_style: String::new(),
                color: String::new(),
                stats: Some(second),
            },
        ];
        assert_eq!(stat_columns(&legends), vec!["average", "total"]);
    }
}
