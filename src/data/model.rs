use std::fmt;

use chrono::{Datelike, NaiveDate};

// ---------------------------------------------------------------------------
// Location – the monitoring station a reading came from
// ---------------------------------------------------------------------------

/// The fixed set of stations the dashboard knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Location {
    ManuaLoa,
    SouthPole,
    Alert,
}

impl Location {
    /// All stations, in the order their sources are concatenated.
    pub const ALL: [Location; 3] = [Location::ManuaLoa, Location::SouthPole, Location::Alert];

    /// Label shown in the table, the chart legends and matched by `eq` filters.
    pub fn label(self) -> &'static str {
        match self {
            Location::ManuaLoa => "Manua Loa",
            Location::SouthPole => "South Pole",
            Location::Alert => "Alert",
        }
    }

    /// Position in [`Location::ALL`], used for stable colour assignment.
    pub fn index(self) -> usize {
        match self {
            Location::ManuaLoa => 0,
            Location::SouthPole => 1,
            Location::Alert => 2,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Column – the addressable fields of an observation
// ---------------------------------------------------------------------------

/// A named column of the unified dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Date,
    Co2Ppm,
    Location,
    Year,
    Month,
    Day,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Date,
        Column::Co2Ppm,
        Column::Location,
        Column::Year,
        Column::Month,
        Column::Day,
    ];

    /// Canonical column name as it appears in filter expressions and table headers.
    pub fn name(self) -> &'static str {
        match self {
            Column::Date => "date",
            Column::Co2Ppm => "CO2 in ppm",
            Column::Location => "location",
            Column::Year => "year",
            Column::Month => "month",
            Column::Day => "day",
        }
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Whether `>` / `<` comparisons make sense on this column.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Column::Co2Ppm | Column::Year | Column::Month | Column::Day
        )
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A typed cell value read out of an [`Observation`].
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(&'static str),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl CellValue {
    /// Numeric interpretation for ordering comparisons.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Observation – one row of the unified dataset
// ---------------------------------------------------------------------------

/// A single CO2 reading. Calendar fields are derived from `date` on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    /// CO2 concentration in parts per million. NaN marks a missing reading.
    pub co2_ppm: f64,
    pub location: Location,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl Observation {
    pub fn new(date: NaiveDate, co2_ppm: f64, location: Location) -> Self {
        Observation {
            date,
            co2_ppm,
            location,
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn cell(&self, column: Column) -> CellValue {
        match column {
            Column::Date => CellValue::Date(self.date),
            Column::Co2Ppm => CellValue::Float(self.co2_ppm),
            Column::Location => CellValue::Text(self.location.label()),
            Column::Year => CellValue::Integer(i64::from(self.year)),
            Column::Month => CellValue::Integer(i64::from(self.month)),
            Column::Day => CellValue::Integer(i64::from(self.day)),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the unified table
// ---------------------------------------------------------------------------

/// All observations from every station, in source concatenation order.
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    observations: Vec<Observation>,
}

impl Dataset {
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        Dataset { observations }
    }

    pub fn get(&self, index: usize) -> Option<&Observation> {
        self.observations.get(index)
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Indices of every observation, i.e. the unfiltered view.
    pub fn all_indices(&self) -> Vec<usize> {
        (0..self.observations.len()).collect()
    }
}
