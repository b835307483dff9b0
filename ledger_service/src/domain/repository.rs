use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::Page;

use crate::domain::entities::{TransactionEntry, TransactionGroup, Wallet};
use crate::domain::error::EngineError;
use crate::domain::types::{
    CorrelationKey, EntryId, GroupId, ReconciliationReport, TerminalStatus, WalletEntryCursor,
    WalletId,
};

/// Puerto (interfaz de dominio) hacia el almacén de journal (C1).
///
/// Cada método que puede fallar por E/S envuelve el error subyacente en
/// `EngineError::Transient`; violaciones de invariantes producen
/// `Validation`/`Integrity`/`State`/`ZeroSum` en su lugar. Los métodos que
/// abarcan varias filas (settle/finalize/refund/pipeline) poseen su propia
/// transacción de principio a fin — el llamador nunca ve un estado parcial.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Registro mínimo de una wallet (identidad, kind, divisa) para
    /// validación de divisa y locking; la propiedad real vive fuera del core.
    async fn register_wallet(&self, wallet: Wallet) -> Result<Wallet, EngineError>;

    async fn find_wallet(&self, id: WalletId) -> Result<Option<Wallet>, EngineError>;

    /// Enumera todas las wallets registradas, usado por los jobs de
    /// pipeline (C5) para recorrer el universo de wallets en cada corrida.
    async fn list_wallet_ids(&self) -> Result<Vec<WalletId>, EngineError>;

    /// Abre un grupo nuevo, o devuelve el existente si `idempotency_key` ya
    /// fue usada antes (spec §4.2 "Open group").
    async fn create_group(
        &self,
        idempotency_key: Option<CorrelationKey>,
    ) -> Result<TransactionGroup, EngineError>;

    async fn get_group(&self, id: GroupId) -> Result<TransactionGroup, EngineError>;

    /// HOLD/DEBIT. Transacción única: lock de fila de wallet, chequeo de
    /// `availableBalance`, inserción. `EngineError::InsufficientFunds` si no alcanza.
    async fn hold_debit(
        &self,
        wallet_id: WalletId,
        amount: i64,
        group_id: GroupId,
    ) -> Result<TransactionEntry, EngineError>;

    /// HOLD/CREDIT. Sin chequeo de saldo (entrante).
    async fn hold_credit(
        &self,
        wallet_id: WalletId,
        amount: i64,
        group_id: GroupId,
    ) -> Result<TransactionEntry, EngineError>;

    /// Liquida el grupo: suma los HOLD, exige cero, emite copias SETTLED de
    /// la misma magnitud/tipo, transiciona el grupo. Todo en una transacción.
    async fn settle_group(&self, group_id: GroupId) -> Result<Vec<TransactionEntry>, EngineError>;

    /// Mecánica compartida de release/cancel (spec §9 "Reversals as data, not
    /// code paths"): emite entradas compensatorias (tipo y signo opuestos)
    /// para cada HOLD del grupo y transiciona al estado terminal dado.
    async fn finalize_group(
        &self,
        group_id: GroupId,
        target_status: TerminalStatus,
        reason: Option<String>,
    ) -> Result<Vec<TransactionEntry>, EngineError>;

    /// Reversión atómica post-settlement: dos entradas SETTLED directas
    /// (sin fase HOLD) dentro del grupo indicado.
    async fn refund(
        &self,
        group_id: GroupId,
        source_wallet_id: WalletId,
        dest_wallet_id: WalletId,
        amount: i64,
        allow_negative: bool,
    ) -> Result<(TransactionEntry, TransactionEntry), EngineError>;

    async fn entries_of_group(&self, group_id: GroupId) -> Result<Vec<TransactionEntry>, EngineError>;

    /// Lectura paginada por cursor (finalizeTimestamp, entryId), activa +
    /// snapshot (archive excluida por defecto, por latencia).
    async fn entries_of_wallet(
        &self,
        wallet_id: WalletId,
        cursor: Option<WalletEntryCursor>,
        limit: i64,
    ) -> Result<Page<TransactionEntry>, EngineError>;

    /// Suma firmada de entradas SETTLED (incluye checkpoints LEDGER), activa + snapshot.
    async fn confirmed_balance(&self, wallet_id: WalletId) -> Result<i64, EngineError>;

    /// |Suma| de entradas HOLD/DEBIT cuyo grupo sigue IN_PROGRESS.
    async fn held_debit_amount(&self, wallet_id: WalletId) -> Result<i64, EngineError>;

    /// Suma de entradas HOLD/CREDIT cuyo grupo sigue IN_PROGRESS (introspección únicamente).
    async fn reserved_balance(&self, wallet_id: WalletId) -> Result<i64, EngineError>;

    async fn reconciliation_sum(&self) -> Result<ReconciliationReport, EngineError>;

    /// Migra a snapshot toda entrada activa cuyo grupo sea terminal. Devuelve
    /// el número de entradas movidas. Atómico de punta a punta.
    async fn move_active_to_snapshot(&self, wallet_id: WalletId) -> Result<u64, EngineError>;

    /// Condensa el rango snapshot anterior a `cutoff` en un checkpoint LEDGER
    /// y archiva las filas originales. Devuelve el id de la entrada de
    /// checkpoint creada, o `None` si no había nada que consolidar.
    async fn consolidate_snapshot(
        &self,
        wallet_id: WalletId,
        cutoff: DateTime<Utc>,
    ) -> Result<Option<EntryId>, EngineError>;
}
