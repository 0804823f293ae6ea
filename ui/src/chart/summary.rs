//! Monthly summary table: per group, each month's total and hourly rate,
//! newest month first.

use std::cmp::Ordering;

use api::DataResponse;

use crate::core::timing;

use super::legend::SortState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Total,
    Hourly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryHeader {
    pub index: usize,
    pub kind: ColumnKind,
    /// Month name, e.g. `March`.
    pub month: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub name: String,
    /// Two cells per month: total, then total divided by the month's hours.
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryColumn {
    Name,
    Value(usize),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryTable {
    pub headers: Vec<SummaryHeader>,
    pub rows: Vec<SummaryRow>,
    sort: SortState<SummaryColumn>,
}

impl SummaryTable {
    /// Builds the table from a monthly breakdown; the newest month closes at
    /// `now_millis`.
    pub fn from_response(response: &DataResponse, now_millis: i64) -> Self {
        let mut months = response.time.clone().unwrap_or_default();
        months.reverse();
        let mut hours = response.hours.clone().unwrap_or_default();
        hours.reverse();

        let mut headers = Vec::with_capacity(months.len() * 2);
        for (index, month) in months.iter().enumerate() {
            let label = timing::format_month_millis(*month);
            let start = timing::format_range_millis(*month);
            let end = timing::format_range_millis(if index == 0 {
                now_millis
            } else {
                months[index - 1]
            });
            for (offset, kind) in [ColumnKind::Total, ColumnKind::Hourly].into_iter().enumerate() {
                headers.push(SummaryHeader {
                    index: 2 * index + offset,
                    kind,
                    month: label.clone(),
                    start: start.clone(),
                    end: end.clone(),
                });
            }
        }

        let rows = response
            .data
            .iter()
            .map(|(name, totals)| {
                let values = totals
                    .iter()
                    .rev()
                    .enumerate()
                    .flat_map(|(index, total)| {
                        let hourly = match hours.get(index) {
                            Some(hours) if *hours != 0.0 => total / hours,
                            _ => 0.0,
                        };
                        [*total, hourly]
                    })
                    .collect();
                SummaryRow {
                    name: name.clone(),
                    values,
                }
            })
            .collect();

        Self {
            headers,
            rows,
            sort: SortState::default(),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.name.clone()).collect()
    }

    pub fn sort_by(&mut self, column: SummaryColumn) {
        self.sort.select(column, column == SummaryColumn::Name);
        let sort = &self.sort;
        self.rows.sort_by(|a, b| {
            let ordering = match sort.column {
                Some(SummaryColumn::Value(index)) => {
                    let a = a.values.get(index).copied().unwrap_or(0.0);
                    let b = b.values.get(index).copied().unwrap_or(0.0);
                    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
                }
                _ => a.name.cmp(&b.name),
            };
            sort.apply(ordering)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    const JAN: i64 = 1_704_067_200_000;
    const FEB: i64 = 1_706_745_600_000;

    fn monthly() -> DataResponse {
        let mut data = IndexMap::new();
        data.insert("ec2".to_string(), vec![744.0, 1392.0]);
        data.insert("s3".to_string(), vec![372.0, 0.0]);
        DataResponse {
            status: 200,
            data,
            time: Some(vec![JAN, FEB]),
            hours: Some(vec![744.0, 696.0]),
            ..DataResponse::default()
        }
    }

    #[test]
    fn newest_month_first_with_hourly_rates() {
        let table = SummaryTable::from_response(&monthly(), FEB + 86_400_000);
        assert_eq!(table.headers.len(), 4);
        assert_eq!(table.headers[0].start, "2024-02-01 12AM");
        assert_eq!(table.headers[0].end, "2024-02-02 12AM");
        assert_eq!(table.headers[2].start, "2024-01-01 12AM");
        assert_eq!(table.headers[2].end, "2024-02-01 12AM");
        assert_eq!(table.headers[1].kind, ColumnKind::Hourly);
        assert_eq!(table.headers[0].month, "February");

        assert_eq!(table.rows[0].values, vec![1392.0, 2.0, 744.0, 1.0]);
        assert_eq!(table.rows[1].values, vec![0.0, 0.0, 372.0, 0.5]);
    }

    #[test]
    fn value_columns_sort_descending_first() {
        let mut table = SummaryTable::from_response(&monthly(), FEB);
        table.sort_by(SummaryColumn::Value(2));
        assert_eq!(table.names(), vec!["ec2", "s3"]);
        table.sort_by(SummaryColumn::Value(2));
        assert_eq!(table.names(), vec!["s3", "ec2"]);
        table.sort_by(SummaryColumn::Name);
        assert_eq!(table.names(), vec!["ec2", "s3"]);
    }
}
