use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::db::LoginRecordStore;
use crate::handlers::form;
use crate::service::connection_actor::ConnectionManager;

/// Form posts carry two short fields; anything bigger is rejected with 413.
pub const FORM_BODY_LIMIT: usize = 16 * 1024;

#[derive(Clone)]
pub struct StepformState {
    pub connection: ConnectionManager,
    pub records: LoginRecordStore,
}

impl StepformState {
    pub fn new(connection: ConnectionManager) -> Self {
        let records = LoginRecordStore::new(connection.clone());
        Self {
            connection,
            records,
        }
    }
}

pub fn stepform_router(state: StepformState) -> Router {
    Router::new()
        .route("/", get(form::index))
        .route("/next", post(form::next))
        .route("/password", get(form::password))
        .route("/signin", post(form::signin))
        .layer(DefaultBodyLimit::max(FORM_BODY_LIMIT))
        .with_state(state)
}
