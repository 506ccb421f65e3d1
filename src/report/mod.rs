// src/report/mod.rs
pub mod handlers;
pub mod store;
pub mod types;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::state::SharedState;

pub use types::{ProblemReport, ReportCategory, ReportStatus};

pub fn report_router() -> Router<SharedState> {
    use handlers::*;

    Router::new()
        .route("/reports", get(list_reports_handler).post(create_report_handler))
        .route(
            "/reports/{id}",
            get(get_report_handler).delete(delete_report_handler),
        )
        .route("/reports/{id}/status", patch(update_status_handler))
}
