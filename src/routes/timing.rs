use axum::{
    extract::Query,
    response::{IntoResponse, Json, Response},
};

use crate::dto::exam_dto::{ClockSyncRequest, ClockSyncResponse, TimingQuery, TimingResponse};
use crate::services::timing_service::{format_label, timing_for};
use crate::utils::time::{drift_ms, format, now_ms};

#[axum::debug_handler]
pub async fn get_timing(Query(query): Query<TimingQuery>) -> crate::error::Result<Response> {
    let item_type = query.item_type.as_deref();
    let timing = timing_for(&query.section, item_type);
    let response = TimingResponse {
        display: format(timing.budget_ms()),
        label: format_label(&query.section, item_type),
        timing,
    };
    Ok(Json(response).into_response())
}

#[axum::debug_handler]
pub async fn sync_clock(Json(req): Json<ClockSyncRequest>) -> crate::error::Result<Response> {
    let server_now_ms = now_ms();
    Ok(Json(ClockSyncResponse {
        server_now_ms,
        drift_ms: drift_ms(server_now_ms, req.client_now_ms),
    })
    .into_response())
}
