use std::sync::Arc;

use lowquery_core::application::LowQueryService;

use crate::args::Args;

#[derive(Clone)]
pub struct AppState {
    pub args: Arc<Args>,
    pub service: LowQueryService,
}

impl AppState {
    pub fn new(args: Arc<Args>, service: LowQueryService) -> Self {
        Self { args, service }
    }
}
