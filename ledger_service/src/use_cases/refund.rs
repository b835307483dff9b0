use std::sync::Arc;

use crate::domain::entities::TransactionEntry;
use crate::domain::error::EngineError;
use crate::domain::repository::JournalStore;
use crate::domain::types::{GroupId, WalletId};

/// Caso de uso C3 `refund`: primitiva de reversión post-settlement. Emite dos
/// entradas SETTLED directas (sin fase HOLD) dentro de un grupo ya existente:
/// DEBIT en origen, CREDIT en destino.
#[derive(Clone)]
pub struct RefundUseCase {
    journal: Arc<dyn JournalStore>,
}

impl RefundUseCase {
    pub fn new(journal: Arc<dyn JournalStore>) -> Self {
        Self { journal }
    }

    #[tracing::instrument(name = "RefundUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        group_id: GroupId,
        source_wallet_id: WalletId,
        dest_wallet_id: WalletId,
        amount: i64,
        allow_negative: bool,
    ) -> Result<(TransactionEntry, TransactionEntry), EngineError> {
        if amount <= 0 {
            return Err(EngineError::Validation(
                "refund amount must be positive".into(),
            ));
        }
        self.journal
            .refund(group_id, source_wallet_id, dest_wallet_id, amount, allow_negative)
            .await
    }
}
