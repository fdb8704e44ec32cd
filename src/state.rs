use std::sync::Arc;

use serde::Serialize;

use crate::color::LocationColors;
use crate::data::aggregate::monthly_means;
use crate::data::filter::evaluate;
use crate::data::model::Dataset;
use crate::ui::plot::{Figure, monthly_chart, raw_chart};
use crate::ui::table::{TableColumn, TableRow, table_columns, table_rows};

// ---------------------------------------------------------------------------
// Filter phase
// ---------------------------------------------------------------------------

/// Whether the viewer has supplied a filter yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterPhase {
    Unfiltered,
    Filtered { expression: String },
}

// ---------------------------------------------------------------------------
// Rendered view
// ---------------------------------------------------------------------------

/// Everything the page needs to draw the table and both charts.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<TableRow>,
    pub raw_chart: Figure<String>,
    pub monthly_chart: Figure<u32>,
    pub visible_rows: usize,
    pub total_rows: usize,
}

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Interaction state for the single viewer. The dataset is shared read-only;
/// every filter change recomputes the view from the full dataset.
pub struct Dashboard {
    dataset: Arc<Dataset>,
    colors: LocationColors,
    phase: FilterPhase,
    /// Indices of observations passing the current filter.
    visible_indices: Vec<usize>,
}

impl Dashboard {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let visible_indices = dataset.all_indices();
        Dashboard {
            dataset,
            colors: LocationColors::default(),
            phase: FilterPhase::Unfiltered,
            visible_indices,
        }
    }

    pub fn phase(&self) -> &FilterPhase {
        &self.phase
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Apply new filter text. The dashboard leaves `Unfiltered` on the first
    /// non-blank text; after that every edit, blank or not, stays `Filtered`.
    ///
    /// Text that does not parse selects everything. The reason is logged,
    /// never returned to the page.
    pub fn apply_filter(&mut self, raw: Option<&str>) -> DashboardView {
        if let Some(expression) = raw {
            let supplied = !expression.trim().is_empty();
            if supplied || matches!(self.phase, FilterPhase::Filtered { .. }) {
                log::debug!("Filter changed to {expression:?}");
                self.phase = FilterPhase::Filtered {
                    expression: expression.to_string(),
                };
            }
        }

        let evaluation = evaluate(&self.dataset, raw);
        if let Some(err) = &evaluation.error {
            log::warn!("Ignoring filter {raw:?}: {err}");
        }
        self.visible_indices = evaluation.indices;

        self.view()
    }

    /// Render the current view.
    pub fn view(&self) -> DashboardView {
        let indices = &self.visible_indices;
        let series = monthly_means(&self.dataset, indices);

        DashboardView {
            columns: table_columns(),
            rows: table_rows(&self.dataset, indices),
            raw_chart: raw_chart(&self.dataset, indices, &self.colors),
            monthly_chart: monthly_chart(&series, &self.colors),
            visible_rows: indices.len(),
            total_rows: self.dataset.len(),
        }
    }
}
