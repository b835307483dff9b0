use std::sync::Arc;

use crate::domain::entities::TransactionEntry;
use crate::domain::error::EngineError;
use crate::domain::repository::JournalStore;
use crate::domain::types::GroupId;

/// Caso de uso de lectura `groupEntries`: toda entrada con el groupId dado,
/// a través de todas las tiers, ordenada por id.
#[derive(Clone)]
pub struct GroupEntriesUseCase {
    journal: Arc<dyn JournalStore>,
}

impl GroupEntriesUseCase {
    pub fn new(journal: Arc<dyn JournalStore>) -> Self {
        Self { journal }
    }

    pub async fn execute(&self, group_id: GroupId) -> Result<Vec<TransactionEntry>, EngineError> {
        self.journal.entries_of_group(group_id).await
    }
}
