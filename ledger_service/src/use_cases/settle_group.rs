use std::sync::Arc;

use crate::domain::entities::TransactionEntry;
use crate::domain::error::EngineError;
use crate::domain::repository::JournalStore;
use crate::domain::types::GroupId;

/// Caso de uso C2 `settleGroup`. Precondición: grupo IN_PROGRESS. El Journal
/// Store hace todo el trabajo dentro de una sola transacción: suma los HOLD,
/// exige cero (si no, `ZeroSumError` y el grupo queda IN_PROGRESS intacto),
/// emite las copias SETTLED, y transiciona el grupo.
#[derive(Clone)]
pub struct SettleGroupUseCase {
    journal: Arc<dyn JournalStore>,
}

impl SettleGroupUseCase {
    pub fn new(journal: Arc<dyn JournalStore>) -> Self {
        Self { journal }
    }

    #[tracing::instrument(name = "SettleGroupUseCase::execute", skip(self))]
    pub async fn execute(&self, group_id: GroupId) -> Result<Vec<TransactionEntry>, EngineError> {
        self.journal.settle_group(group_id).await
    }
}
