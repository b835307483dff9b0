use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::domain::error::EngineError;
use crate::domain::repository::JournalStore;
use crate::domain::types::WalletId;

/// Job en segundo plano que mueve a la tier snapshot toda entrada activa
/// cuyo grupo ya haya terminado (spec §4.5, paso "moveActiveToSnapshot").
///
/// Grounded on the teacher's `RetryFailedTransactionJob`: un struct que
/// sostiene el puerto, un método `run` que recorre el universo relevante
/// y loguea progreso, sin detener el resto del lote si una wallet falla.
pub struct SnapshotJob {
    journal: Arc<dyn JournalStore>,
}

impl SnapshotJob {
    pub fn new(journal: Arc<dyn JournalStore>) -> Self {
        Self { journal }
    }

    /// Corre la migración para una única wallet.
    pub async fn run_for_wallet(&self, wallet_id: WalletId) -> Result<u64, EngineError> {
        self.journal.move_active_to_snapshot(wallet_id).await
    }

    /// Recorre todas las wallets registradas, deteniéndose entre wallets si
    /// `cancel` se activa (la migración de una wallet en curso nunca se
    /// interrumpe a mitad de camino, ya que vive en una única transacción).
    pub async fn run(&self, cancel: &CancellationToken) {
        info!("Starting SnapshotJob...");

        let wallet_ids = match self.journal.list_wallet_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                error!("Failed to list wallets for snapshot job: {:?}", e);
                return;
            }
        };

        let mut total_moved: u64 = 0;
        for wallet_id in wallet_ids {
            if cancel.is_cancelled() {
                warn!("SnapshotJob cancelled after processing {} wallets", total_moved);
                return;
            }

            match self.run_for_wallet(wallet_id).await {
                Ok(0) => {}
                Ok(moved) => {
                    info!("Moved {} entries to snapshot for wallet {}", moved, wallet_id);
                    total_moved += moved;
                }
                Err(e) => {
                    error!("Snapshot migration failed for wallet {}: {:?}", wallet_id, e);
                }
            }
        }

        info!("SnapshotJob finished, moved {} entries total", total_moved);
    }
}
