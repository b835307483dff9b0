use std::sync::Arc;

use crate::domain::error::EngineError;
use crate::domain::repository::JournalStore;
use crate::domain::types::{EntryId, GroupId, WalletId};

/// Caso de uso C3 `holdCredit`: promesa de fondos entrantes. Sin chequeo de
/// saldo, a diferencia de `holdDebit`.
#[derive(Clone)]
pub struct HoldCreditUseCase {
    journal: Arc<dyn JournalStore>,
}

impl HoldCreditUseCase {
    pub fn new(journal: Arc<dyn JournalStore>) -> Self {
        Self { journal }
    }

    #[tracing::instrument(name = "HoldCreditUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        wallet_id: WalletId,
        amount: i64,
        group_id: GroupId,
    ) -> Result<EntryId, EngineError> {
        if amount <= 0 {
            return Err(EngineError::Validation(
                "holdCredit amount must be positive".into(),
            ));
        }
        let entry = self.journal.hold_credit(wallet_id, amount, group_id).await?;
        Ok(entry.id())
    }
}
