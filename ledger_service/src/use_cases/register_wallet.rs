use std::sync::Arc;

use crate::domain::entities::Wallet;
use crate::domain::error::EngineError;
use crate::domain::repository::JournalStore;
use crate::domain::types::{Currency, WalletId, WalletKind};

/// Registro de una wallet nueva. No forma parte de los cinco componentes
/// centrales (C1-C5) pero es el único punto de entrada por el que una
/// wallet llega a existir antes de que C1-C4 puedan operar sobre ella.
#[derive(Clone)]
pub struct RegisterWalletUseCase {
    journal: Arc<dyn JournalStore>,
}

impl RegisterWalletUseCase {
    pub fn new(journal: Arc<dyn JournalStore>) -> Self {
        Self { journal }
    }

    pub async fn execute(
        &self,
        kind: WalletKind,
        currency: Currency,
        owner_id: Option<String>,
        description: String,
    ) -> Result<Wallet, EngineError> {
        let wallet = Wallet::new(kind, currency, owner_id, description);
        self.journal.register_wallet(wallet).await
    }

    pub async fn find(&self, wallet_id: WalletId) -> Result<Wallet, EngineError> {
        self.journal
            .find_wallet(wallet_id)
            .await?
            .ok_or(EngineError::WalletNotFound(wallet_id))
    }
}
