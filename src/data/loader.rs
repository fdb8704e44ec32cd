use anyhow::{Context, Result, bail};
use chrono::NaiveDate;

use super::model::{Dataset, Location, Observation};

// ---------------------------------------------------------------------------
// Source description
// ---------------------------------------------------------------------------

/// Where a station's readings live and how to pick them out of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub location: Location,
    pub url: String,
    /// Number of leading preamble lines before the first data record.
    pub skip_rows: usize,
    /// Zero-based column holding the date.
    pub date_column: usize,
    /// Zero-based column holding the CO2 reading.
    pub value_column: usize,
}

const MAUNA_LOA_URL: &str =
    "http://scrippsco2.ucsd.edu/assets/data/atmospheric/stations/in_situ_co2/weekly/weekly_in_situ_co2_mlo.csv";
const SOUTH_POLE_URL: &str =
    "http://scrippsco2.ucsd.edu/assets/data/atmospheric/stations/merged_in_situ_and_flask/daily/daily_merge_co2_spo.csv";
const ALERT_URL: &str =
    "http://scrippsco2.ucsd.edu/assets/data/atmospheric/stations/flask_co2/daily/daily_flask_co2_alt.csv";

/// The three Scripps station records, in concatenation order.
pub fn station_sources() -> Vec<SourceSpec> {
    vec![
        SourceSpec {
            location: Location::ManuaLoa,
            url: MAUNA_LOA_URL.to_string(),
            skip_rows: 44,
            date_column: 0,
            value_column: 1,
        },
        SourceSpec {
            location: Location::SouthPole,
            url: SOUTH_POLE_URL.to_string(),
            skip_rows: 71,
            date_column: 0,
            value_column: 6,
        },
        SourceSpec {
            location: Location::Alert,
            url: ALERT_URL.to_string(),
            skip_rows: 69,
            date_column: 0,
            value_column: 6,
        },
    ]
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// Retrieves the raw text of a source.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Plain HTTP GET via a blocking `reqwest` client.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        HttpFetcher {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("requesting {url}"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("GET {url} returned {status}");
        }
        response
            .text()
            .with_context(|| format!("reading response body of {url}"))
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Fetch and parse every source, concatenating them into one dataset.
///
/// Any failing source fails the whole load; there is no partial dataset.
pub fn load_dataset(fetcher: &dyn Fetch, sources: &[SourceSpec]) -> Result<Dataset> {
    let mut observations = Vec::new();

    for source in sources {
        log::info!("Fetching {} readings from {}", source.location, source.url);
        let text = fetcher
            .fetch(&source.url)
            .with_context(|| format!("fetching {} data", source.location))?;
        let rows = parse_source(&text, source)
            .with_context(|| format!("parsing {} data", source.location))?;
        log::info!("Loaded {} {} readings", rows.len(), source.location);
        observations.extend(rows);
    }

    Ok(Dataset::from_observations(observations))
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Parse one station file: skip the preamble, then read the configured
/// date and value columns of every remaining record.
pub fn parse_source(text: &str, source: &SourceSpec) -> Result<Vec<Observation>> {
    let body = skip_lines(text, source.skip_rows);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let needed = source.date_column.max(source.value_column) + 1;
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result.context("malformed CSV record")?;
        let line = source.skip_rows + record.position().map_or(0, |p| p.line() as usize);

        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        if record.len() < needed {
            bail!(
                "line {line}: expected at least {needed} columns, found {}",
                record.len()
            );
        }

        let date_text = record.get(source.date_column).unwrap_or("");
        let value_text = record.get(source.value_column).unwrap_or("");

        let date = parse_date(date_text)
            .with_context(|| format!("line {line}: '{date_text}' is not a date"))?;
        let co2_ppm = parse_measurement(value_text)
            .with_context(|| format!("line {line}: '{value_text}' is not a number"))?;

        rows.push(Observation::new(date, co2_ppm, source.location));
    }

    Ok(rows)
}

fn skip_lines(text: &str, n: usize) -> &str {
    let mut rest = text;
    for _ in 0..n {
        match rest.find('\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return "",
        }
    }
    rest
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time component.
fn parse_date(s: &str) -> Result<NaiveDate> {
    let date_part = s.split([' ', 'T']).next().unwrap_or("");
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(Into::into)
}

/// A blank cell is a missing reading, stored as NaN like the literal `NaN` token.
fn parse_measurement(s: &str) -> Result<f64> {
    if s.is_empty() {
        return Ok(f64::NAN);
    }
    s.parse::<f64>().map_err(Into::into)
}
