use std::sync::Arc;

use crate::domain::entities::TransactionEntry;
use crate::domain::error::EngineError;
use crate::domain::repository::JournalStore;
use crate::domain::types::{GroupId, TerminalStatus};

/// Caso de uso C2 `cancelGroup`: aborto pre-settlement. Misma mecánica que
/// `release_group`, sólo cambia la etiqueta del estado terminal producido.
#[derive(Clone)]
pub struct CancelGroupUseCase {
    journal: Arc<dyn JournalStore>,
}

impl CancelGroupUseCase {
    pub fn new(journal: Arc<dyn JournalStore>) -> Self {
        Self { journal }
    }

    #[tracing::instrument(name = "CancelGroupUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        group_id: GroupId,
        reason: String,
    ) -> Result<Vec<TransactionEntry>, EngineError> {
        self.journal
            .finalize_group(group_id, TerminalStatus::Cancelled, Some(reason))
            .await
    }
}
