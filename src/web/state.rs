use std::sync::Arc;

use crate::{
    Config,
    model::{ModelManager, Store},
};

#[derive(Debug, Clone)]
pub struct AppState {
    mm: ModelManager,
    config: Arc<Config>,
}

impl AppState {
    pub fn new(mm: ModelManager, config: Arc<Config>) -> Self {
        Self { mm, config }
    }

    pub fn store(&self) -> &dyn Store {
        self.mm.store()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
