use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::domain::error::EngineError;
use crate::domain::repository::JournalStore;
use crate::domain::types::{EntryId, WalletId};

/// Job mensual de consolidación de archivo (spec §4.5, "Monthly archive"
/// `consolidateSnapshot`): condensa el rango snapshot anterior a un cutoff
/// en un checkpoint de ledger por wallet y mueve las filas originales a la
/// tier archive.
pub struct ArchiveJob {
    journal: Arc<dyn JournalStore>,
}

impl ArchiveJob {
    pub fn new(journal: Arc<dyn JournalStore>) -> Self {
        Self { journal }
    }

    pub async fn run_for_wallet(
        &self,
        wallet_id: WalletId,
        cutoff: DateTime<Utc>,
    ) -> Result<Option<EntryId>, EngineError> {
        self.journal.consolidate_snapshot(wallet_id, cutoff).await
    }

    /// Recorre todas las wallets registradas, consolidando cada una por
    /// separado. Se detiene entre wallets si `cancel` se activa, nunca a
    /// mitad de la consolidación de una wallet (que es una única transacción).
    pub async fn run(&self, cutoff: DateTime<Utc>, cancel: &CancellationToken) {
        info!("Starting ArchiveJob with cutoff {}...", cutoff);

        let wallet_ids = match self.journal.list_wallet_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                error!("Failed to list wallets for archive job: {:?}", e);
                return;
            }
        };

        let mut checkpoints_created = 0u64;
        for wallet_id in wallet_ids {
            if cancel.is_cancelled() {
                warn!("ArchiveJob cancelled after consolidating {} wallets", checkpoints_created);
                return;
            }

            match self.run_for_wallet(wallet_id, cutoff).await {
                Ok(None) => {}
                Ok(Some(checkpoint_id)) => {
                    info!(
                        "Consolidated snapshot range for wallet {} into checkpoint entry {}",
                        wallet_id, checkpoint_id
                    );
                    checkpoints_created += 1;
                }
                Err(e) => {
                    error!("Archive consolidation failed for wallet {}: {:?}", wallet_id, e);
                }
            }
        }

        info!("ArchiveJob finished, created {} checkpoints", checkpoints_created);
    }
}
