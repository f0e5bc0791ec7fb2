use std::sync::Arc;

use crate::domain::ports::inbound::HazardRetrieval;

#[derive(Clone)]
pub struct AppState {
    pub hazards: Arc<dyn HazardRetrieval>,
}

impl AppState {
    pub fn new(hazards: Arc<dyn HazardRetrieval>) -> Self {
        Self { hazards }
    }
}
