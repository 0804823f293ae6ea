use dioxus::prelude::*;

use crate::chart::summary::{ColumnKind, SummaryHeader, SummaryRow};
use crate::chart::{LegendController, PageChart, SummaryColumn, SummaryTable};
use crate::core::format;

/// Monthly totals and hourly rates. Sorting the table reorders the chart.
#[component]
pub fn SummaryPanel(
    summary: Signal<Option<SummaryTable>>,
    legend: Signal<LegendController<PageChart>>,
    currency_sign: String,
) -> Element {
    let Some(table) = summary() else {
        return rsx! {};
    };
    let mut summary = summary;
    let mut legend = legend;

    let mut sort = move |column: SummaryColumn| {
        let order = summary.with_mut(|table| {
            table.as_mut().map(|table| {
                table.sort_by(column);
                table.names()
            })
        });
        if let Some(order) = order {
            legend.with_mut(|controller| controller.reorder(&order));
        }
    };

    rsx! {
        table { class: "summary",
            thead {
                tr {
                    th { rowspan: "2", class: "summary__sortable", onclick: move |_| sort(SummaryColumn::Name), "Name" }
                    for header in table.headers.iter().filter(|h| h.kind == ColumnKind::Total) {
                        th { key: "{header.index}", colspan: "2", title: "{header.start} to {header.end}", "{header.month}" }
                    }
                }
                tr {
                    for header in table.headers.iter().cloned() {
                        {render_header(header, sort)}
                    }
                }
            }
            tbody {
                for row in table.rows.iter() {
                    {render_row(row, &currency_sign)}
                }
            }
        }
    }
}

fn render_header(header: SummaryHeader, mut sort: impl FnMut(SummaryColumn) + 'static) -> Element {
    let label = match header.kind {
        ColumnKind::Total => "Total",
        ColumnKind::Hourly => "Per hour",
    };
    let index = header.index;
    rsx! {
        th {
            key: "{index}",
            class: "summary__sortable",
            onclick: move |_| sort(SummaryColumn::Value(index)),
            "{label}"
        }
    }
}

fn render_row(row: &SummaryRow, sign: &str) -> Element {
    let cells: Vec<String> = row
        .values
        .iter()
        .map(|value| format::format_amount(sign, *value))
        .collect();
    rsx! {
        tr { key: "{row.name}",
            td { class: "summary__name", "{row.name}" }
            for (index, cell) in cells.iter().enumerate() {
                td { key: "{index}", class: "summary__value", "{cell}" }
            }
        }
    }
}
