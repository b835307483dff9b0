use std::sync::Arc;

use crate::domain::error::EngineError;
use crate::domain::repository::JournalStore;
use crate::domain::types::WalletId;

/// C4 — deriva los cuatro saldos nombrados en spec §4.4 a partir de
/// agregados delgados expuestos por el Journal Store. Sin estado propio;
/// cada llamada es una lectura read-committed, no una transacción del
/// llamador.
#[derive(Clone)]
pub struct BalanceCalculator {
    journal: Arc<dyn JournalStore>,
}

impl BalanceCalculator {
    pub fn new(journal: Arc<dyn JournalStore>) -> Self {
        Self { journal }
    }

    pub async fn confirmed_balance(&self, wallet_id: WalletId) -> Result<i64, EngineError> {
        self.journal.confirmed_balance(wallet_id).await
    }

    pub async fn held_debit_amount(&self, wallet_id: WalletId) -> Result<i64, EngineError> {
        self.journal.held_debit_amount(wallet_id).await
    }

    /// `confirmed - held_debit`. Los holds de crédito se ignoran
    /// deliberadamente: fondos entrantes no deben ser gastables antes de
    /// liquidarse.
    #[tracing::instrument(name = "BalanceCalculator::available_balance", skip(self))]
    pub async fn available_balance(&self, wallet_id: WalletId) -> Result<i64, EngineError> {
        let confirmed = self.journal.confirmed_balance(wallet_id).await?;
        let held_debit = self.journal.held_debit_amount(wallet_id).await?;
        Ok(confirmed - held_debit)
    }

    /// Saldo reservado por holds de crédito, sólo para introspección — nunca
    /// usado por ninguna precondición.
    pub async fn reserved_balance(&self, wallet_id: WalletId) -> Result<i64, EngineError> {
        self.journal.reserved_balance(wallet_id).await
    }
}
