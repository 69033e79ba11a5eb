use crate::{
    errors::ServiceError,
    handlers::{
        common::{attachment_response, success_response},
        extract::Query,
    },
    services::reports::{DailyReportQuery, ReportOutput, ReportQuery, SalesReport},
    AppState,
};
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};

/// Sales report as JSON, CSV or PDF
#[utoipa::path(
    get,
    path = "/api/reports/sales",
    params(ReportQuery),
    responses(
        (status = 200, description = "Report as JSON; `format=csv|pdf` returns an attachment instead", body = SalesReport),
        (status = 400, description = "Invalid query", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "reports"
)]
pub async fn sales_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ServiceError> {
    Ok(match state.services.reports.export(&query).await? {
        ReportOutput::Json(report) => success_response(report),
        ReportOutput::File(file) => attachment_response(file),
    })
}

/// CSV of one date and one shift
#[utoipa::path(
    get,
    path = "/api/reports/daily",
    params(DailyReportQuery),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv"),
        (status = 400, description = "Invalid query", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "reports"
)]
pub async fn daily_report(
    State(state): State<AppState>,
    Query(query): Query<DailyReportQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let file = state
        .services
        .reports
        .daily_shift_report(query.date, query.shift)
        .await?;
    Ok(attachment_response(file))
}
