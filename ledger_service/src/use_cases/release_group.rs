use std::sync::Arc;

use crate::domain::entities::TransactionEntry;
use crate::domain::error::EngineError;
use crate::domain::repository::JournalStore;
use crate::domain::types::{GroupId, TerminalStatus};

/// Caso de uso C2 `releaseGroup`: rollback pre-settlement, representado como
/// entradas compensatorias (spec §9). Delgado a propósito — fija
/// `target_status` y delega al mismo mecanismo que `cancel_group`.
#[derive(Clone)]
pub struct ReleaseGroupUseCase {
    journal: Arc<dyn JournalStore>,
}

impl ReleaseGroupUseCase {
    pub fn new(journal: Arc<dyn JournalStore>) -> Self {
        Self { journal }
    }

    #[tracing::instrument(name = "ReleaseGroupUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        group_id: GroupId,
        reason: String,
    ) -> Result<Vec<TransactionEntry>, EngineError> {
        self.journal
            .finalize_group(group_id, TerminalStatus::Released, Some(reason))
            .await
    }
}
