use std::sync::Arc;

use crate::domain::error::EngineError;
use crate::domain::repository::JournalStore;
use crate::domain::types::ReconciliationReport;

/// Caso de uso de lectura `reconciliation`: suma firmada total y desglose
/// por estado, a través de todas las tiers. Expuesto a operadores para
/// auditoría, no usado por ninguna precondición interna.
#[derive(Clone)]
pub struct ReconciliationUseCase {
    journal: Arc<dyn JournalStore>,
}

impl ReconciliationUseCase {
    pub fn new(journal: Arc<dyn JournalStore>) -> Self {
        Self { journal }
    }

    pub async fn execute(&self) -> Result<ReconciliationReport, EngineError> {
        self.journal.reconciliation_sum().await
    }
}
