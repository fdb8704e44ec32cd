use anyhow::{Context, Result};

use crate::state::DashboardView;

const VIEW_PLACEHOLDER: &str = "__INITIAL_VIEW__";

/// Render the dashboard document with `view` embedded as its first state.
pub fn render_page(view: &DashboardView) -> Result<String> {
    let json = serde_json::to_string(view).context("serializing initial view")?;
    // Keep the payload from closing the surrounding <script> element.
    let json = json.replace("</", "<\\/");
    Ok(DASHBOARD_HTML.replace(VIEW_PLACEHOLDER, &json))
}

const DASHBOARD_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Atmospheric CO2</title>
  <link rel="stylesheet" href="https://codepen.io/chriddyp/pen/bWLwgP.css" />
  <script src="https://cdn.plot.ly/plotly-2.35.2.min.js" charset="utf-8"></script>
  <style>
    .table-wrap { max-height: 300px; overflow-y: scroll; }
    table.data { font-size: 12px; width: 100%; }
    table.data th input { width: 100%; height: 24px; padding: 2px 4px; margin: 0; }
    table.data th button { height: 18px; line-height: 16px; padding: 0 4px; margin: 0 0 0 4px; }
    .status { font-size: 12px; color: #888; }
  </style>
</head>
<body>
  <div class="row">
    <div class="six columns">
      <div class="table-wrap">
        <table class="data">
          <thead><tr id="header-row"></tr><tr id="filter-row"></tr></thead>
          <tbody id="table-body"></tbody>
        </table>
      </div>
      <div id="status" class="status"></div>
    </div>
    <div id="monthly-chart" class="six columns"></div>
  </div>
  <div class="row">
    <div id="raw-chart" class="twelve columns"></div>
  </div>

  <script>
    let latestRequest = 0;
    const state = {
      view: __INITIAL_VIEW__,
      visible: null,
      filters: {},
    };
    state.visible = state.view.columns.map(c => c.id);

    function filterExpression() {
      return state.visible
        .filter(id => (state.filters[id] || "").trim() !== "")
        .map(id => `"${id}" ${state.filters[id].trim()}`)
        .join(" && ");
    }

    function formatCell(value) {
      return value === null || value === undefined ? "" : String(value);
    }

    function renderTable() {
      const columns = state.view.columns.filter(c => state.visible.includes(c.id));
      const header = document.getElementById("header-row");
      const filterRow = document.getElementById("filter-row");
      header.replaceChildren();
      filterRow.replaceChildren();

      for (const column of columns) {
        const th = document.createElement("th");
        th.textContent = column.name;
        if (column.deletable) {
          const del = document.createElement("button");
          del.textContent = "×";
          del.title = `Remove ${column.name}`;
          del.onclick = () => {
            state.visible = state.visible.filter(id => id !== column.id);
            delete state.filters[column.id];
            refresh();
          };
          th.appendChild(del);
        }
        header.appendChild(th);

        const fth = document.createElement("th");
        const input = document.createElement("input");
        input.placeholder = "eq …, > …, < …";
        input.value = state.filters[column.id] || "";
        input.onchange = () => {
          state.filters[column.id] = input.value;
          refresh();
        };
        fth.appendChild(input);
        filterRow.appendChild(fth);
      }

      const rows = document.createDocumentFragment();
      for (const row of state.view.rows) {
        const tr = document.createElement("tr");
        for (const column of columns) {
          const td = document.createElement("td");
          td.textContent = formatCell(row[column.id]);
          tr.appendChild(td);
        }
        rows.appendChild(tr);
      }
      document.getElementById("table-body").replaceChildren(rows);
    }

    function renderStatus() {
      const status = document.getElementById("status");
      const { visible_rows, total_rows } = state.view;
      status.textContent = `${visible_rows} of ${total_rows} rows`;
    }

    function renderCharts() {
      Plotly.react("raw-chart", state.view.raw_chart.data, state.view.raw_chart.layout);
      Plotly.react("monthly-chart", state.view.monthly_chart.data, state.view.monthly_chart.layout);
    }

    function render() {
      renderTable();
      renderStatus();
      renderCharts();
    }

    // Only the most recent edit may repaint; older responses are dropped.
    async function refresh() {
      const ticket = ++latestRequest;
      const query = encodeURIComponent(filterExpression());
      const response = await fetch(`/api/view?filter=${query}`);
      if (ticket !== latestRequest) return;
      if (!response.ok) {
        document.getElementById("status").textContent = `request failed: ${response.status}`;
        return;
      }
      const view = await response.json();
      if (ticket !== latestRequest) return;
      state.view = view;
      render();
    }

    render();
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::{Dataset, Location, Observation};
    use crate::state::Dashboard;

    #[test]
    fn page_embeds_the_initial_view() {
        let date = NaiveDate::from_ymd_opt(2010, 4, 2).unwrap();
        let dataset = Dataset::from_observations(vec![Observation::new(
            date,
            389.5,
            Location::SouthPole,
        )]);
        let view = Dashboard::new(Arc::new(dataset)).view();

        let html = render_page(&view).unwrap();
        assert!(!html.contains(VIEW_PLACEHOLDER));
        assert!(html.contains("\"location\":\"South Pole\""));
        assert!(html.contains("All data for selected period"));
    }

    #[test]
    fn page_renders_every_row() {
        let start = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        let observations = (0..1500)
            .map(|i| Observation::new(start + chrono::Days::new(i), 350.0, Location::Alert))
            .collect();
        let view = Dashboard::new(Arc::new(Dataset::from_observations(observations))).view();
        assert_eq!(view.rows.len(), 1500);

        let html = render_page(&view).unwrap();
        assert_eq!(html.matches("\"location\":\"Alert\"").count(), 1500);
        assert!(html.contains("for (const row of state.view.rows)"));
        assert!(!html.contains("slice("));
    }

    #[test]
    fn stale_responses_are_ignored() {
        let html = DASHBOARD_HTML;
        assert!(html.contains("const ticket = ++latestRequest;"));
        assert_eq!(html.matches("if (ticket !== latestRequest) return;").count(), 2);
    }

    #[test]
    fn page_has_no_filter_error_line() {
        assert!(!DASHBOARD_HTML.contains("filter_error"));
        assert!(!DASHBOARD_HTML.contains("filter ignored"));
    }
}
