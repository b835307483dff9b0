use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::entities::{TransactionEntry, TransactionGroup, Wallet};
use crate::domain::types::{
    CorrelationKey, Currency, EntryId, EntryStatus, EntryType, GroupId, GroupStatus, WalletId,
    WalletKind,
};

/// Modelo de Base de Datos para Wallet (específico de SQLx).
/// Representa la tabla `wallet`.
#[derive(Debug, FromRow)]
pub struct WalletRow {
    pub id: WalletId,
    pub kind: WalletKind,
    pub currency: Currency,
    pub owner_id: Option<String>,
    pub description: String,
}

impl From<WalletRow> for Wallet {
    fn from(r: WalletRow) -> Self {
        Wallet::reconstitute(r.id, r.kind, r.currency, r.owner_id, r.description)
    }
}

/// Modelo de Base de Datos para TransactionGroup.
/// Representa la tabla `transaction_group`.
#[derive(Debug, FromRow)]
pub struct GroupRow {
    pub id: GroupId,
    pub status: GroupStatus,
    pub created_at: DateTime<Utc>,
    pub finalized_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub idempotency_key: Option<String>,
}

impl From<GroupRow> for TransactionGroup {
    fn from(r: GroupRow) -> Self {
        TransactionGroup::reconstitute(
            r.id,
            r.status,
            r.created_at,
            r.finalized_at,
            r.reason,
            r.idempotency_key.and_then(CorrelationKey::new),
        )
    }
}

/// Modelo de Base de Datos para una TransactionEntry.
///
/// Usado para las tres tablas (`transaction_entry`, `transaction_entry_snapshot`,
/// `transaction_entry_archive`); la query de la tier activa proyecta
/// `NULL::timestamptz` y `false` para las dos columnas que sólo existen en
/// snapshot/archive, de modo que un único modelo cubre las tres.
#[derive(Debug, FromRow)]
pub struct EntryRow {
    pub id: EntryId,
    pub wallet_id: WalletId,
    pub group_id: Option<GroupId>,
    pub entry_type: EntryType,
    pub status: EntryStatus,
    pub amount: i64,
    pub hold_timestamp: DateTime<Utc>,
    pub finalize_timestamp: Option<DateTime<Utc>>,
    pub description: String,
    pub is_ledger_entry: bool,
    pub correlation_key: Option<String>,
    pub snapshot_date: Option<DateTime<Utc>>,
}

impl From<EntryRow> for TransactionEntry {
    fn from(r: EntryRow) -> Self {
        TransactionEntry::reconstitute(
            r.id,
            r.wallet_id,
            r.group_id,
            r.entry_type,
            r.status,
            r.amount,
            r.hold_timestamp,
            r.finalize_timestamp,
            r.description,
            r.is_ledger_entry,
            r.correlation_key.and_then(CorrelationKey::new),
            r.snapshot_date,
        )
    }
}
