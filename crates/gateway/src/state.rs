use crate::metrics::Metrics;
use inference::InspectionPipeline;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: InspectionPipeline,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(pipeline: InspectionPipeline) -> Self {
        Self {
            pipeline,
            metrics: Arc::new(Metrics::init("gateway")),
        }
    }
}
