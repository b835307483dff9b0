use std::sync::Arc;

use crate::domain::entities::TransactionGroup;
use crate::domain::error::EngineError;
use crate::domain::repository::JournalStore;
use crate::domain::types::GroupId;

/// Caso de uso de lectura `groupStatus`.
#[derive(Clone)]
pub struct GroupStatusUseCase {
    journal: Arc<dyn JournalStore>,
}

impl GroupStatusUseCase {
    pub fn new(journal: Arc<dyn JournalStore>) -> Self {
        Self { journal }
    }

    pub async fn execute(&self, group_id: GroupId) -> Result<TransactionGroup, EngineError> {
        self.journal.get_group(group_id).await
    }
}
