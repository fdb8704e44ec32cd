use std::collections::BTreeMap;

use super::model::{Dataset, Location};

/// Mean CO2 reading per calendar month for one station.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeries {
    pub location: Location,
    /// `(month, mean)` pairs, month ascending. Months without readings are absent.
    pub points: Vec<(u32, f64)>,
}

/// Stations present in the view, in order of first appearance.
pub fn locations_in(dataset: &Dataset, indices: &[usize]) -> Vec<Location> {
    let mut seen = Vec::new();
    for obs in indices.iter().filter_map(|&i| dataset.get(i)) {
        if !seen.contains(&obs.location) {
            seen.push(obs.location);
        }
    }
    seen
}

/// Group the view by station, then by month, and average the readings.
/// Missing (NaN) readings do not contribute to a mean.
pub fn monthly_means(dataset: &Dataset, indices: &[usize]) -> Vec<MonthlySeries> {
    let mut sums: BTreeMap<Location, BTreeMap<u32, (f64, usize)>> = BTreeMap::new();

    for obs in indices.iter().filter_map(|&i| dataset.get(i)) {
        if obs.co2_ppm.is_nan() {
            continue;
        }
        let slot = sums
            .entry(obs.location)
            .or_default()
            .entry(obs.month)
            .or_insert((0.0, 0));
        slot.0 += obs.co2_ppm;
        slot.1 += 1;
    }

    locations_in(dataset, indices)
        .into_iter()
        .map(|location| {
            let points = sums
                .get(&location)
                .map(|months| {
                    months
                        .iter()
                        .map(|(&month, &(sum, count))| (month, sum / count as f64))
                        .collect()
                })
                .unwrap_or_default();
            MonthlySeries { location, points }
        })
        .collect()
}
