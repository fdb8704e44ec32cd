use serde::Serialize;

use crate::data::model::{Column, Dataset};

/// Columns shown in the table, in display order.
pub const TABLE_COLUMNS: [Column; 5] = [
    Column::Year,
    Column::Month,
    Column::Day,
    Column::Co2Ppm,
    Column::Location,
];

/// Column header description consumed by the page script.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TableColumn {
    pub name: &'static str,
    pub id: &'static str,
    pub deletable: bool,
}

/// One table row; keys match [`TableColumn::id`].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TableRow {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    #[serde(rename = "CO2 in ppm")]
    pub co2_ppm: f64,
    pub location: &'static str,
}

pub fn table_columns() -> Vec<TableColumn> {
    TABLE_COLUMNS
        .iter()
        .map(|c| TableColumn {
            name: c.name(),
            id: c.name(),
            deletable: true,
        })
        .collect()
}

pub fn table_rows(dataset: &Dataset, indices: &[usize]) -> Vec<TableRow> {
    indices
        .iter()
        .filter_map(|&i| dataset.get(i))
        .map(|obs| TableRow {
            year: obs.year,
            month: obs.month,
            day: obs.day,
            co2_ppm: obs.co2_ppm,
            location: obs.location.label(),
        })
        .collect()
}
