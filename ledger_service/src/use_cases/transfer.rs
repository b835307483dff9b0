use std::sync::Arc;

use tracing::warn;

use crate::domain::error::EngineError;
use crate::domain::repository::JournalStore;
use crate::domain::types::{CorrelationKey, GroupId, TerminalStatus, WalletId};

/// Caso de uso C2 `transfer`: composición de conveniencia sobre open/hold/settle.
/// Grounded en la forma de orquestación de `ProcessTransactionUseCase` del
/// servicio de transacciones: guardar la intención, invocar a los
/// colaboradores, reconciliar el resultado — adaptada aquí para abrir un
/// grupo, sostener dos holds y liquidar en vez de delegar a un gateway.
///
/// Ante cualquier falla antes del settle, cancela el grupo y reporta el
/// error original (no el de la cancelación, que es un best-effort).
#[derive(Clone)]
pub struct TransferUseCase {
    journal: Arc<dyn JournalStore>,
}

impl TransferUseCase {
    pub fn new(journal: Arc<dyn JournalStore>) -> Self {
        Self { journal }
    }

    #[tracing::instrument(name = "TransferUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        sender: WalletId,
        recipient: WalletId,
        amount: i64,
        idempotency_key: Option<CorrelationKey>,
    ) -> Result<GroupId, EngineError> {
        if amount <= 0 {
            return Err(EngineError::Validation("transfer amount must be positive".into()));
        }

        let group = self.journal.create_group(idempotency_key).await?;
        let group_id = group.id();

        if group.is_terminal() {
            // Hit de idempotencia sobre un grupo ya resuelto: nada más que hacer.
            return Ok(group_id);
        }

        if let Err(e) = self.journal.hold_debit(sender, amount, group_id).await {
            self.abort(group_id, &e).await;
            return Err(e);
        }

        if let Err(e) = self.journal.hold_credit(recipient, amount, group_id).await {
            self.abort(group_id, &e).await;
            return Err(e);
        }

        if let Err(e) = self.journal.settle_group(group_id).await {
            self.abort(group_id, &e).await;
            return Err(e);
        }

        Ok(group_id)
    }

    async fn abort(&self, group_id: GroupId, cause: &EngineError) {
        let reason = format!("transfer aborted: {cause}");
        if let Err(e) = self
            .journal
            .finalize_group(group_id, TerminalStatus::Cancelled, Some(reason))
            .await
        {
            warn!("failed to cancel group {} after transfer failure: {}", group_id, e);
        }
    }
}
