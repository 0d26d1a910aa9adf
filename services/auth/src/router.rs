use axum::{
    Router,
    routing::{get, post},
};

use shofy_core::error::not_found;
use shofy_core::health::{healthz, readyz};
use shofy_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    otp::{send_otp, verify_otp},
    token::{check_token, logout},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // OTP login
        .route("/v1/auth/otp/send", post(send_otp))
        .route("/v1/auth/otp/verify", post(verify_otp))
        // Session token
        .route("/v1/auth/token", get(check_token))
        .route("/v1/users/logout/{user_id}", post(logout))
        .fallback(not_found)
        .with_state(state)
        // Request id is set outermost so the trace span can see it.
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
}
