//! Actix Web server exposing the dashboard page and its view API.
//!
//! One worker serves one viewer: the dataset is shared read-only and the
//! interaction state sits behind a mutex so every filter edit is handled to
//! completion before the next.

use std::sync::{Arc, Mutex};

use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::DashboardConfig;
use crate::data::model::Dataset;
use crate::state::{Dashboard, FilterPhase};
use crate::ui::page::render_page;

/// Shared state backing HTTP handlers.
pub struct ServerState {
    dashboard: Mutex<Dashboard>,
    /// Page rendered from the unfiltered dataset at startup.
    page: String,
}

impl ServerState {
    pub fn new(dataset: Arc<Dataset>) -> Result<Self> {
        let dashboard = Dashboard::new(dataset);
        let page = render_page(&dashboard.view())?;
        Ok(ServerState {
            dashboard: Mutex::new(dashboard),
            page,
        })
    }
}

#[derive(Deserialize)]
struct ViewQuery {
    filter: Option<String>,
}

/// Register the dashboard routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index_route))
        .route("/api/view", web::get().to(view_handler))
        .route("/health", web::get().to(health_handler));
}

/// Run the server until it is stopped.
pub fn serve(config: &DashboardConfig, dataset: Arc<Dataset>) -> Result<()> {
    let state = web::Data::new(ServerState::new(dataset)?);
    let debug = config.debug;
    let addr = (config.host.clone(), config.port);

    log::info!("Serving dashboard on http://{}:{}", config.host, config.port);

    actix_web::rt::System::new()
        .block_on(async move {
            HttpServer::new(move || {
                App::new()
                    .wrap(middleware::Condition::new(debug, middleware::Logger::default()))
                    .app_data(state.clone())
                    .configure(routes)
            })
            .workers(1)
            .bind(addr)?
            .run()
            .await
        })
        .context("running HTTP server")
}

/// Serve the dashboard document.
async fn index_route(state: web::Data<ServerState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(state.page.clone())
}

/// Apply the `filter` query parameter and return the recomputed view.
async fn view_handler(
    query: web::Query<ViewQuery>,
    state: web::Data<ServerState>,
) -> HttpResponse {
    let mut dashboard = match state.dashboard.lock() {
        Ok(guard) => guard,
        Err(err) => return HttpResponse::InternalServerError().body(err.to_string()),
    };
    let view = dashboard.apply_filter(query.filter.as_deref());
    HttpResponse::Ok().json(view)
}

async fn health_handler(state: web::Data<ServerState>) -> HttpResponse {
    match state.dashboard.lock() {
        Ok(dashboard) => {
            let phase = match dashboard.phase() {
                FilterPhase::Unfiltered => "unfiltered",
                FilterPhase::Filtered { .. } => "filtered",
            };
            HttpResponse::Ok()
                .content_type("text/plain; charset=utf-8")
                .body(format!(
                    "ok: {} observations, {phase}\n",
                    dashboard.dataset().len()
                ))
        }
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test;
    use chrono::NaiveDate;
    use serde_json::Value;

    use super::*;
    use crate::data::model::{Location, Observation};

    fn state() -> web::Data<ServerState> {
        let d = |m| NaiveDate::from_ymd_opt(2017, m, 15).unwrap();
        let dataset = Dataset::from_observations(vec![
            Observation::new(d(1), 406.0, Location::ManuaLoa),
            Observation::new(d(1), 402.0, Location::SouthPole),
            Observation::new(d(1), 399.5, Location::Alert),
            Observation::new(d(2), 408.0, Location::Alert),
        ]);
        web::Data::new(ServerState::new(Arc::new(dataset)).unwrap())
    }

    #[actix_web::test]
    async fn index_serves_html_page() {
        let app = test::init_service(App::new().app_data(state()).configure(routes)).await;
        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let html = std::str::from_utf8(&body).unwrap();
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("Manua Loa"));
    }

    #[actix_web::test]
    async fn view_without_filter_returns_everything() {
        let app = test::init_service(App::new().app_data(state()).configure(routes)).await;
        let req = test::TestRequest::get().uri("/api/view").to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(view["visible_rows"], 4);
        assert_eq!(view["raw_chart"]["data"].as_array().unwrap().len(), 3);
        assert_eq!(view["raw_chart"]["layout"]["height"], 350);
        assert_eq!(view["monthly_chart"]["layout"]["height"], 250);
    }

    #[actix_web::test]
    async fn view_applies_combined_filter() {
        let app = test::init_service(App::new().app_data(state()).configure(routes)).await;
        let req = test::TestRequest::get()
            .uri("/api/view?filter=%22location%22%20eq%20Alert%20%26%26%20%22CO2%20in%20ppm%22%20%3E%20400")
            .to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(view["visible_rows"], 1);
        assert_eq!(view["rows"][0]["CO2 in ppm"], 408.0);
        assert_eq!(view["raw_chart"]["data"][0]["name"], "Alert");
    }

    #[actix_web::test]
    async fn malformed_filter_falls_back_silently() {
        let app = test::init_service(App::new().app_data(state()).configure(routes)).await;
        let req = test::TestRequest::get()
            .uri("/api/view?filter=location%20%3E%20north")
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        let text = std::str::from_utf8(&body).unwrap();
        assert!(!text.contains("north"));
        assert!(!text.contains("filter_error"));

        let view: Value = serde_json::from_str(text).unwrap();
        assert_eq!(view["visible_rows"], 4);
    }

    #[actix_web::test]
    async fn health_reports_dataset_size() {
        let app = test::init_service(App::new().app_data(state()).configure(routes)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(&body[..], b"ok: 4 observations, unfiltered\n");
    }
}
