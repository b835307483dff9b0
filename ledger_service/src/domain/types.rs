use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use common::{CorrelationKey, Currency, EntryId, GroupId, WalletId};

/// Naturaleza de una Wallet. Sólo identidad y kind son consumidos por el core;
/// la relación de propiedad es externa al motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "wallet_kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalletKind {
    User,
    Merchant,
    Escrow,
    System,
    Deposit,
    Withdrawal,
}

/// Tipo de una TransactionEntry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "entry_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    Debit,
    Credit,
    Ledger,
}

impl EntryType {
    /// El tipo opuesto, usado al emitir entradas de reversión (RELEASED/CANCELLED).
    pub fn opposite(self) -> Self {
        match self {
            EntryType::Debit => EntryType::Credit,
            EntryType::Credit => EntryType::Debit,
            EntryType::Ledger => EntryType::Ledger,
        }
    }
}

/// Estado de una TransactionEntry individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "entry_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    Hold,
    Settled,
    Released,
    Cancelled,
    Refunded,
}

/// Estado de una TransactionGroup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "group_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupStatus {
    InProgress,
    Settled,
    Released,
    Cancelled,
}

/// Los tres únicos destinos legales de una transición terminal de grupo.
/// Usado para parametrizar `finalize_group` en lugar de tener un code path
/// separado por cada transición (release y cancel sólo difieren en la etiqueta).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalStatus {
    Settled,
    Released,
    Cancelled,
}

impl TerminalStatus {
    pub fn as_group_status(self) -> GroupStatus {
        match self {
            TerminalStatus::Settled => GroupStatus::Settled,
            TerminalStatus::Released => GroupStatus::Released,
            TerminalStatus::Cancelled => GroupStatus::Cancelled,
        }
    }

    pub fn as_entry_status(self) -> EntryStatus {
        match self {
            TerminalStatus::Settled => EntryStatus::Settled,
            TerminalStatus::Released => EntryStatus::Released,
            TerminalStatus::Cancelled => EntryStatus::Cancelled,
        }
    }
}

/// Cursor de paginación keyset para `entriesOfWallet`: (finalizeTimestamp, entryId).
/// Evita el drift de un cursor por offset sobre una tabla append-only en crecimiento.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletEntryCursor {
    pub finalize_timestamp: DateTime<Utc>,
    pub entry_id: EntryId,
}

impl WalletEntryCursor {
    pub fn encode(&self) -> String {
        format!("{}|{}", self.finalize_timestamp.to_rfc3339(), self.entry_id)
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let (ts, id) = raw.split_once('|')?;
        let finalize_timestamp = DateTime::parse_from_rfc3339(ts).ok()?.with_timezone(&Utc);
        let entry_id = EntryId(id.parse().ok()?);
        Some(Self {
            finalize_timestamp,
            entry_id,
        })
    }
}

impl fmt::Display for WalletEntryCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

/// Reporte de reconciliación: suma total firmada y desglose por estado,
/// a través de las tres tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub total: i64,
    pub per_status: Vec<(EntryStatus, i64)>,
}
