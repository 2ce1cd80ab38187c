pub mod attempts;
pub mod health;
pub mod timing;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/mock-tests/:test_id", get(mock_tests::load_test))
        .route("/api/mock-tests/:test_id/access", get(mock_tests::check_access))
        .route("/api/mock-tests/:test_id/attempts", post(mock_tests::start_attempt))
        .route("/api/attempts/:attempt_id", get(attempts::get_session))
        .route("/api/attempts/:attempt_id/answers", post(attempts::submit_answer))
        .route("/api/attempts/:attempt_id/advance", post(attempts::advance))
        .route("/api/attempts/:attempt_id/pause", post(attempts::pause))
        .route("/api/attempts/:attempt_id/resume", post(attempts::resume))
        .route("/api/attempts/:attempt_id/complete", post(attempts::complete))
        .route("/api/timing", get(timing::get_timing))
        .route("/api/clock/sync", post(timing::sync_clock))
        .with_state(state)
}
