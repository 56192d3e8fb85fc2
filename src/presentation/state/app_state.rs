use std::sync::Arc;

use crate::application::services::{
    ConsumptionBindingController, DocumentIngress, PendingReporter, ProcessingControl, ProcessingLedger,
};

/// Shared handles behind the control API.
#[derive(Clone)]
pub struct AppState {
    pub control: Arc<ProcessingControl>,
    pub consumption: Arc<ConsumptionBindingController>,
    pub ledger: Arc<ProcessingLedger>,
    pub pending: Arc<PendingReporter>,
    pub ingress: Arc<DocumentIngress>,
}
