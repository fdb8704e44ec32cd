use std::fmt;

use thiserror::Error;

use super::model::{Column, Dataset, Observation};

// ---------------------------------------------------------------------------
// Filter expression: a conjunction of column predicates
// ---------------------------------------------------------------------------

/// Separator between clauses of a filter expression.
pub const CLAUSE_SEPARATOR: &str = " && ";

const EQ_TOKEN: &str = " eq ";
const GT_TOKEN: &str = " > ";
const LT_TOKEN: &str = " < ";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("'{value}' is not a number (column '{column}')")]
    NotANumber { column: String, value: String },
    #[error("column '{0}' cannot be compared with > or <")]
    NotOrderable(String),
    #[error("clause '{0}' has no eq, > or < operator")]
    MissingOperator(String),
}

/// How a single column is compared.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    /// Text equality against the cell's rendered value.
    Equals(String),
    GreaterThan(f64),
    LessThan(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: Column,
    pub comparison: Comparison,
}

impl Predicate {
    pub fn matches(&self, obs: &Observation) -> bool {
        let cell = obs.cell(self.column);
        match &self.comparison {
            Comparison::Equals(value) => cell.to_string() == *value,
            Comparison::GreaterThan(bound) => cell.as_f64().is_some_and(|v| v > *bound),
            Comparison::LessThan(bound) => cell.as_f64().is_some_and(|v| v < *bound),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.comparison {
            Comparison::Equals(v) => write!(f, "{} eq {v}", self.column),
            Comparison::GreaterThan(v) => write!(f, "{} > {v}", self.column),
            Comparison::LessThan(v) => write!(f, "{} < {v}", self.column),
        }
    }
}

/// Parsed filter: every predicate must hold. Empty means "no filter".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpr {
    pub predicates: Vec<Predicate>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse `<column> eq <text>`, `<column> > <number>` and `<column> < <number>`
/// clauses joined by `" && "`.
///
/// Each clause takes the first operator found in the order `eq`, `>`, `<`.
/// Blank clauses are ignored, so an empty expression parses to no predicates.
pub fn parse_filter(input: &str) -> Result<FilterExpr, FilterError> {
    let predicates = input
        .split(CLAUSE_SEPARATOR)
        .filter(|clause| !clause.trim().is_empty())
        .map(parse_clause)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(FilterExpr { predicates })
}

fn parse_clause(clause: &str) -> Result<Predicate, FilterError> {
    if let Some((name, value)) = clause.split_once(EQ_TOKEN) {
        let column = resolve_column(name)?;
        return Ok(Predicate {
            column,
            comparison: Comparison::Equals(unquote(value).to_string()),
        });
    }
    if let Some((name, value)) = clause.split_once(GT_TOKEN) {
        let column = resolve_orderable(name)?;
        return Ok(Predicate {
            column,
            comparison: Comparison::GreaterThan(parse_number(column, value)?),
        });
    }
    if let Some((name, value)) = clause.split_once(LT_TOKEN) {
        let column = resolve_orderable(name)?;
        return Ok(Predicate {
            column,
            comparison: Comparison::LessThan(parse_number(column, value)?),
        });
    }
    Err(FilterError::MissingOperator(clause.to_string()))
}

fn unquote(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '"' || c == '\'')
}

fn resolve_column(name: &str) -> Result<Column, FilterError> {
    let name = unquote(name);
    Column::from_name(name).ok_or_else(|| FilterError::UnknownColumn(name.to_string()))
}

fn resolve_orderable(name: &str) -> Result<Column, FilterError> {
    let column = resolve_column(name)?;
    if !column.is_numeric() {
        return Err(FilterError::NotOrderable(column.name().to_string()));
    }
    Ok(column)
}

fn parse_number(column: Column, value: &str) -> Result<f64, FilterError> {
    let text = unquote(value);
    text.parse::<f64>().map_err(|_| FilterError::NotANumber {
        column: column.name().to_string(),
        value: text.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Indices of observations passing every predicate, narrowing in textual order.
pub fn filtered_indices(dataset: &Dataset, filter: &FilterExpr) -> Vec<usize> {
    let mut indices = dataset.all_indices();
    for predicate in &filter.predicates {
        indices.retain(|&i| dataset.get(i).is_some_and(|obs| predicate.matches(obs)));
    }
    indices
}

/// Outcome of evaluating raw filter text against the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub indices: Vec<usize>,
    /// Set when the text did not parse; `indices` then covers the whole dataset.
    pub error: Option<FilterError>,
}

/// Evaluate raw filter text. Missing, empty and malformed input all select
/// the full dataset; a parse failure is reported alongside instead of raised.
pub fn evaluate(dataset: &Dataset, raw: Option<&str>) -> Evaluation {
    let Some(raw) = raw else {
        return Evaluation {
            indices: dataset.all_indices(),
            error: None,
        };
    };

    match parse_filter(raw) {
        Ok(filter) => Evaluation {
            indices: filtered_indices(dataset, &filter),
            error: None,
        },
        Err(err) => Evaluation {
            indices: dataset.all_indices(),
            error: Some(err),
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::Location;

    fn obs(y: i32, m: u32, d: u32, ppm: f64, location: Location) -> Observation {
        Observation::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), ppm, location)
    }

    fn sample() -> Dataset {
        Dataset::from_observations(vec![
            obs(2015, 1, 3, 399.1, Location::ManuaLoa),
            obs(2016, 2, 6, 404.3, Location::ManuaLoa),
            obs(2015, 1, 5, 398.0, Location::SouthPole),
            obs(2017, 3, 9, 403.2, Location::SouthPole),
            obs(2015, 1, 4, 401.7, Location::Alert),
            obs(2016, 6, 1, 407.9, Location::Alert),
            obs(2014, 6, 1, 397.5, Location::Alert),
        ])
    }

    fn locations(ds: &Dataset, indices: &[usize]) -> Vec<Location> {
        indices.iter().map(|&i| ds.get(i).unwrap().location).collect()
    }

    #[test]
    fn empty_and_missing_filters_select_everything() {
        let ds = sample();
        assert_eq!(evaluate(&ds, None).indices, ds.all_indices());
        assert_eq!(evaluate(&ds, Some("")).indices, ds.all_indices());
        assert!(evaluate(&ds, Some("")).error.is_none());
    }

    #[test]
    fn equality_on_location() {
        let ds = sample();
        let eval = evaluate(&ds, Some("location eq Alert"));
        assert_eq!(eval.indices, vec![4, 5, 6]);
        assert!(
            locations(&ds, &eval.indices)
                .iter()
                .all(|&l| l == Location::Alert)
        );
    }

    #[test]
    fn quoted_column_and_value_are_stripped() {
        let ds = sample();
        let eval = evaluate(&ds, Some("\"location\" eq \"South Pole\""));
        assert_eq!(eval.indices, vec![2, 3]);
    }

    #[test]
    fn greater_than_is_strict() {
        let ds = sample();
        let eval = evaluate(&ds, Some("CO2 in ppm > 403.2"));
        assert_eq!(eval.indices, vec![1, 5]);
        assert!(
            eval.indices
                .iter()
                .all(|&i| ds.get(i).unwrap().co2_ppm > 403.2)
        );
    }

    #[test]
    fn less_than_on_derived_column() {
        let ds = sample();
        let eval = evaluate(&ds, Some("year < 2016"));
        assert_eq!(eval.indices, vec![0, 2, 4, 6]);
    }

    #[test]
    fn combined_clauses_intersect() {
        let ds = sample();
        let by_location = evaluate(&ds, Some("location eq Alert")).indices;
        let by_value = evaluate(&ds, Some("CO2 in ppm > 400")).indices;
        let both = evaluate(&ds, Some("location eq Alert && CO2 in ppm > 400")).indices;

        let expected: Vec<usize> = by_location
            .iter()
            .copied()
            .filter(|i| by_value.contains(i))
            .collect();
        assert_eq!(both, expected);
        assert_eq!(both, vec![4, 5]);
    }

    #[test]
    fn equality_on_integer_column_uses_rendered_text() {
        let ds = sample();
        assert_eq!(evaluate(&ds, Some("month eq 6")).indices, vec![5, 6]);
    }

    #[test]
    fn malformed_filters_fall_back_to_everything() {
        let ds = sample();
        for raw in [
            "station eq Alert",
            "CO2 in ppm > lots",
            "location > 3",
            "location is Alert",
            "location eq Alert && nonsense",
        ] {
            let eval = evaluate(&ds, Some(raw));
            assert_eq!(eval.indices, ds.all_indices(), "{raw}");
            assert!(eval.error.is_some(), "{raw}");
        }
    }

    #[test]
    fn parse_errors_are_typed() {
        assert_eq!(
            parse_filter("station eq Alert"),
            Err(FilterError::UnknownColumn("station".into()))
        );
        assert_eq!(
            parse_filter("location < 4"),
            Err(FilterError::NotOrderable("location".into()))
        );
        assert!(matches!(
            parse_filter("day > x"),
            Err(FilterError::NotANumber { .. })
        ));
    }

    #[test]
    fn one_operator_per_clause() {
        // The value contains " > " but the clause is an equality.
        let filter = parse_filter("location eq a > 3").unwrap();
        assert_eq!(filter.predicates.len(), 1);
        assert_eq!(
            filter.predicates[0].comparison,
            Comparison::Equals("a > 3".into())
        );
    }

    #[test]
    fn trailing_separator_is_ignored() {
        let filter = parse_filter("year > 2015 && ").unwrap();
        assert_eq!(filter.predicates.len(), 1);
        assert_eq!(filter.predicates[0].to_string(), "year > 2015");
    }

    #[test]
    fn filtering_never_adds_rows() {
        let ds = sample();
        for raw in ["year > 2000", "day < 5 && month eq 1", "location eq Nowhere"] {
            let eval = evaluate(&ds, Some(raw));
            assert!(eval.indices.len() <= ds.len());
            assert!(eval.indices.iter().all(|&i| i < ds.len()));
        }
        assert!(evaluate(&ds, Some("location eq Nowhere")).indices.is_empty());
    }
}
