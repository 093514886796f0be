use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, store::EntityStore, utils::revalidate::PathRevalidator};

pub type SharedStore = Arc<dyn EntityStore>;
pub type SharedRevalidator = Arc<dyn PathRevalidator>;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub revalidator: SharedRevalidator,
    pub config: Config,
}

impl FromRef<AppState> for SharedStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for SharedRevalidator {
    fn from_ref(state: &AppState) -> Self {
        state.revalidator.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
