use std::sync::Arc;

use crate::domain::entities::TransactionGroup;
use crate::domain::error::EngineError;
use crate::domain::repository::JournalStore;
use crate::domain::types::CorrelationKey;

/// Caso de uso para abrir una TransactionGroup nueva (C2 "Open group").
///
/// Si `idempotency_key` coincide con un grupo ya existente, el Journal Store
/// devuelve ese grupo sin crear uno nuevo.
#[derive(Clone)]
pub struct OpenGroupUseCase {
    journal: Arc<dyn JournalStore>,
}

impl OpenGroupUseCase {
    pub fn new(journal: Arc<dyn JournalStore>) -> Self {
        Self { journal }
    }

    #[tracing::instrument(name = "OpenGroupUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        idempotency_key: Option<CorrelationKey>,
    ) -> Result<TransactionGroup, EngineError> {
        self.journal.create_group(idempotency_key).await
    }
}
