use serde::Serialize;

use crate::color::LocationColors;
use crate::data::aggregate::{MonthlySeries, locations_in};
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Plotly figure description
// ---------------------------------------------------------------------------

pub const RAW_CHART_HEIGHT: u32 = 350;
pub const MONTHLY_CHART_HEIGHT: u32 = 250;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Figure<X> {
    pub data: Vec<Trace<X>>,
    pub layout: Layout,
}

/// One line of a chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Trace<X> {
    pub x: Vec<X>,
    pub y: Vec<f64>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: &'static str,
    pub name: &'static str,
    pub line: LineStyle,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LineStyle {
    pub color: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Layout {
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub height: u32,
    pub margin: Margin,
    pub title: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Axis {
    pub automargin: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Margin {
    pub t: u32,
    pub l: u32,
    pub r: u32,
    pub b: u32,
}

fn line<X>(x: Vec<X>, y: Vec<f64>, name: &'static str, color: &str) -> Trace<X> {
    Trace {
        x,
        y,
        kind: "scatter",
        mode: "lines",
        name,
        line: LineStyle {
            color: color.to_string(),
        },
    }
}

fn layout(height: u32, top_margin: u32, title: &'static str) -> Layout {
    Layout {
        xaxis: Axis { automargin: true },
        yaxis: Axis { automargin: true },
        height,
        margin: Margin {
            t: top_margin,
            l: 10,
            r: 10,
            b: 0,
        },
        title,
    }
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// Raw readings against date, one line per station in the view.
pub fn raw_chart(dataset: &Dataset, indices: &[usize], colors: &LocationColors) -> Figure<String> {
    let data = locations_in(dataset, indices)
        .into_iter()
        .map(|location| {
            let (x, y): (Vec<String>, Vec<f64>) = indices
                .iter()
                .filter_map(|&i| dataset.get(i))
                .filter(|obs| obs.location == location)
                .map(|obs| (obs.date.format("%Y-%m-%d").to_string(), obs.co2_ppm))
                .unzip();
            line(x, y, location.label(), colors.color_for(location))
        })
        .collect();

    Figure {
        data,
        layout: layout(RAW_CHART_HEIGHT, 30, "All data for selected period"),
    }
}

/// Monthly means against month number, one line per station.
pub fn monthly_chart(series: &[MonthlySeries], colors: &LocationColors) -> Figure<u32> {
    let data = series
        .iter()
        .map(|s| {
            let (x, y): (Vec<u32>, Vec<f64>) = s.points.iter().copied().unzip();
            line(x, y, s.location.label(), colors.color_for(s.location))
        })
        .collect();

    Figure {
        data,
        layout: layout(MONTHLY_CHART_HEIGHT, 100, "Monthly average for selected range"),
    }
}
