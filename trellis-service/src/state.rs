use crate::metrics::Metrics;
use std::sync::{Arc, Mutex};
use trellis_core::CollectionIndex;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    /// Single collection index; all core calls happen under this lock from
    /// spawn_blocking so the guarded one-shot initializer cannot race.
    pub index: Mutex<CollectionIndex>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(index: CollectionIndex) -> Self {
        Self {
            index: Mutex::new(index),
            metrics: Metrics::default(),
        }
    }
}
