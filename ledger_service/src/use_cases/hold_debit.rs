use std::sync::Arc;

use crate::domain::error::EngineError;
use crate::domain::repository::JournalStore;
use crate::domain::types::{EntryId, GroupId, WalletId};

/// Caso de uso C3 `holdDebit`: reserva fondos de una wallet dentro de un
/// grupo abierto. El Journal Store valida saldo disponible y existencia de
/// wallet/grupo dentro de una única transacción con lock de fila.
#[derive(Clone)]
pub struct HoldDebitUseCase {
    journal: Arc<dyn JournalStore>,
}

impl HoldDebitUseCase {
    pub fn new(journal: Arc<dyn JournalStore>) -> Self {
        Self { journal }
    }

    #[tracing::instrument(name = "HoldDebitUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        wallet_id: WalletId,
        amount: i64,
        group_id: GroupId,
    ) -> Result<EntryId, EngineError> {
        if amount <= 0 {
            return Err(EngineError::Validation(
                "holdDebit amount must be positive".into(),
            ));
        }
        let entry = self.journal.hold_debit(wallet_id, amount, group_id).await?;
        Ok(entry.id())
    }
}
