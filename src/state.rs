//! Shared application state for all routes.

use crate::api::Api;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<Api>,
}

impl AppState {
    pub fn new(api: Arc<Api>) -> Self {
        AppState { api }
    }
}
