use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::EngineError;
use crate::domain::types::{
    CorrelationKey, Currency, EntryId, EntryStatus, EntryType, GroupId, GroupStatus, WalletId,
    WalletKind,
};

/// Modelo de Entidad: Wallet.
///
/// Sólo identidad, kind y divisa son relevantes para el core; la relación de
/// propiedad (`owner_id`) es un dato externo que el motor conserva pero no
/// interpreta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    id: WalletId,
    kind: WalletKind,
    currency: Currency,
    owner_id: Option<String>,
    description: String,
}

impl Wallet {
    pub fn new(
        kind: WalletKind,
        currency: Currency,
        owner_id: Option<String>,
        description: String,
    ) -> Self {
        Self {
            id: WalletId::new(),
            kind,
            currency,
            owner_id,
            description,
        }
    }

    /// Reconstruye una Wallet cargada desde la persistencia.
    pub fn reconstitute(
        id: WalletId,
        kind: WalletKind,
        currency: Currency,
        owner_id: Option<String>,
        description: String,
    ) -> Self {
        Self {
            id,
            kind,
            currency,
            owner_id,
            description,
        }
    }

    pub fn id(&self) -> WalletId {
        self.id
    }

    pub fn kind(&self) -> WalletKind {
        self.kind
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Borrador de una TransactionEntry previo a su persistencia. El `id` real es
/// asignado por el Journal Store (BIGSERIAL), a diferencia de las entidades
/// `Wallet`/`TransactionGroup` cuyo id es un UUID generado en el dominio.
#[derive(Debug, Clone)]
pub struct NewTransactionEntry {
    pub wallet_id: WalletId,
    pub group_id: Option<GroupId>,
    pub entry_type: EntryType,
    pub status: EntryStatus,
    pub amount: i64,
    pub hold_timestamp: DateTime<Utc>,
    pub finalize_timestamp: Option<DateTime<Utc>>,
    pub description: String,
    pub is_ledger_entry: bool,
    pub correlation_key: Option<CorrelationKey>,
}

impl NewTransactionEntry {
    /// Construye una entrada HOLD validando la concordancia signo-tipo
    /// (invariante 1 sobre TransactionEntry): DEBIT ⇒ amount < 0, CREDIT ⇒ amount > 0.
    pub fn hold(
        wallet_id: WalletId,
        group_id: GroupId,
        entry_type: EntryType,
        magnitude: i64,
        description: String,
    ) -> Result<Self, EngineError> {
        if magnitude <= 0 {
            return Err(EngineError::Validation(
                "amount must be a positive magnitude".into(),
            ));
        }
        let amount = match entry_type {
            EntryType::Debit => -magnitude,
            EntryType::Credit => magnitude,
            EntryType::Ledger => {
                return Err(EngineError::Validation(
                    "LEDGER entries cannot be created via hold".into(),
                ))
            }
        };
        let now = Utc::now();
        Ok(Self {
            wallet_id,
            group_id: Some(group_id),
            entry_type,
            status: EntryStatus::Hold,
            amount,
            hold_timestamp: now,
            finalize_timestamp: None,
            description,
            is_ledger_entry: false,
            correlation_key: None,
        })
    }

    /// Deriva la entrada de finalización correspondiente a un HOLD existente,
    /// según `target_status` (spec §4.3 "finalize"):
    /// - SETTLED: misma magnitud, mismo tipo.
    /// - RELEASED / CANCELLED: tipo y signo opuestos (entrada compensatoria).
    ///
    /// El HOLD original nunca se modifica; esto sólo construye el borrador de
    /// la nueva entrada a insertar.
    pub fn finalizing(hold: &TransactionEntry, target_status: EntryStatus) -> Self {
        let now = Utc::now();
        let (entry_type, amount) = match target_status {
            EntryStatus::Settled => (hold.entry_type(), hold.amount()),
            EntryStatus::Released | EntryStatus::Cancelled => {
                (hold.entry_type().opposite(), -hold.amount())
            }
            EntryStatus::Hold | EntryStatus::Refunded => {
                unreachable!("finalize() is only called with SETTLED/RELEASED/CANCELLED")
            }
        };
        Self {
            wallet_id: hold.wallet_id(),
            group_id: hold.group_id(),
            entry_type,
            status: target_status,
            amount,
            hold_timestamp: hold.hold_timestamp(),
            finalize_timestamp: Some(now),
            description: hold.description().to_string(),
            is_ledger_entry: false,
            correlation_key: None,
        }
    }

    /// Una de las dos entradas SETTLED directas emitidas por un refund
    /// (§4.3): no pasan por una fase HOLD, se asientan ya finalizadas.
    pub fn settled_direct(
        wallet_id: WalletId,
        group_id: GroupId,
        entry_type: EntryType,
        magnitude: i64,
        description: String,
    ) -> Self {
        let amount = match entry_type {
            EntryType::Debit => -magnitude,
            EntryType::Credit => magnitude,
            EntryType::Ledger => magnitude,
        };
        let now = Utc::now();
        Self {
            wallet_id,
            group_id: Some(group_id),
            entry_type,
            status: EntryStatus::Settled,
            amount,
            hold_timestamp: now,
            finalize_timestamp: Some(now),
            description,
            is_ledger_entry: false,
            correlation_key: None,
        }
    }

    /// El checkpoint de ledger emitido por `consolidateSnapshot` (§4.5):
    /// condensa la suma acumulada de un rango archivado en una única entrada
    /// SETTLED sintética, sin grupo real.
    pub fn ledger_checkpoint(wallet_id: WalletId, cumulative: i64, snapshot_date: DateTime<Utc>) -> Self {
        Self {
            wallet_id,
            group_id: None,
            entry_type: EntryType::Ledger,
            status: EntryStatus::Settled,
            amount: cumulative,
            hold_timestamp: snapshot_date,
            finalize_timestamp: Some(snapshot_date),
            description: "archive consolidation checkpoint".to_string(),
            is_ledger_entry: true,
            correlation_key: None,
        }
    }
}

/// Una TransactionEntry persistida. Inmutable una vez creada: el único
/// mecanismo que mueve su contenido es la migración de tier en C5, que
/// re-persiste el mismo contenido lógico en otra tabla antes de remover el
/// original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEntry {
    id: EntryId,
    wallet_id: WalletId,
    group_id: Option<GroupId>,
    entry_type: EntryType,
    status: EntryStatus,
    amount: i64,
    hold_timestamp: DateTime<Utc>,
    finalize_timestamp: Option<DateTime<Utc>>,
    description: String,
    is_ledger_entry: bool,
    correlation_key: Option<CorrelationKey>,
    snapshot_date: Option<DateTime<Utc>>,
}

impl TransactionEntry {
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: EntryId,
        wallet_id: WalletId,
        group_id: Option<GroupId>,
        entry_type: EntryType,
        status: EntryStatus,
        amount: i64,
        hold_timestamp: DateTime<Utc>,
        finalize_timestamp: Option<DateTime<Utc>>,
        description: String,
        is_ledger_entry: bool,
        correlation_key: Option<CorrelationKey>,
        snapshot_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            wallet_id,
            group_id,
            entry_type,
            status,
            amount,
            hold_timestamp,
            finalize_timestamp,
            description,
            is_ledger_entry,
            correlation_key,
            snapshot_date,
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn wallet_id(&self) -> WalletId {
        self.wallet_id
    }

    pub fn group_id(&self) -> Option<GroupId> {
        self.group_id
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn hold_timestamp(&self) -> DateTime<Utc> {
        self.hold_timestamp
    }

    pub fn finalize_timestamp(&self) -> Option<DateTime<Utc>> {
        self.finalize_timestamp
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_ledger_entry(&self) -> bool {
        self.is_ledger_entry
    }

    pub fn correlation_key(&self) -> Option<&CorrelationKey> {
        self.correlation_key.as_ref()
    }

    pub fn snapshot_date(&self) -> Option<DateTime<Utc>> {
        self.snapshot_date
    }
}

/// Modelo de Entidad: TransactionGroup. Estado representado como suma
/// etiquetada (`GroupStatus`) en lugar de cadenas de texto sueltas; las
/// variantes terminales son inmutables una vez alcanzadas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionGroup {
    id: GroupId,
    status: GroupStatus,
    created_at: DateTime<Utc>,
    finalized_at: Option<DateTime<Utc>>,
    reason: Option<String>,
    idempotency_key: Option<CorrelationKey>,
}

impl TransactionGroup {
    pub fn open(idempotency_key: Option<CorrelationKey>) -> Self {
        Self {
            id: GroupId::new(),
            status: GroupStatus::InProgress,
            created_at: Utc::now(),
            finalized_at: None,
            reason: None,
            idempotency_key,
        }
    }

    pub fn reconstitute(
        id: GroupId,
        status: GroupStatus,
        created_at: DateTime<Utc>,
        finalized_at: Option<DateTime<Utc>>,
        reason: Option<String>,
        idempotency_key: Option<CorrelationKey>,
    ) -> Self {
        Self {
            id,
            status,
            created_at,
            finalized_at,
            reason,
            idempotency_key,
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn status(&self) -> GroupStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.status, GroupStatus::InProgress)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn finalized_at(&self) -> Option<DateTime<Utc>> {
        self.finalized_at
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn idempotency_key(&self) -> Option<&CorrelationKey> {
        self.idempotency_key.as_ref()
    }
}

/// Mapeo de una entrada de checkpoint de ledger al conjunto de groupIds que
/// consolida. Creado exclusivamente por C5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerCheckpointLink {
    pub checkpoint_entry_id: EntryId,
    pub group_id: GroupId,
}
