use std::sync::Arc;

use common::Page;

use crate::domain::entities::TransactionEntry;
use crate::domain::error::EngineError;
use crate::domain::repository::JournalStore;
use crate::domain::types::{WalletEntryCursor, WalletId};

/// Caso de uso de lectura `entriesOfWallet`, paginado por cursor
/// (finalizeTimestamp, entryId) sobre activa + snapshot.
#[derive(Clone)]
pub struct WalletEntriesUseCase {
    journal: Arc<dyn JournalStore>,
}

impl WalletEntriesUseCase {
    pub fn new(journal: Arc<dyn JournalStore>) -> Self {
        Self { journal }
    }

    pub async fn execute(
        &self,
        wallet_id: WalletId,
        cursor: Option<String>,
        limit: i64,
    ) -> Result<Page<TransactionEntry>, EngineError> {
        // A malformed cursor is treated as "start from the beginning" rather
        // than a hard error, since the cursor is opaque to callers.
        let cursor = cursor.and_then(|raw| WalletEntryCursor::decode(&raw));
        self.journal.entries_of_wallet(wallet_id, cursor, limit).await
    }
}
