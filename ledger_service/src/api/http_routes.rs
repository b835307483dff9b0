use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::response::ApiResponse;
use crate::domain::types::{Currency, EntryId, GroupId, WalletId, WalletKind};
use crate::use_cases::{
    balance_calculator::BalanceCalculator, cancel_group::CancelGroupUseCase,
    group_entries::GroupEntriesUseCase, group_status::GroupStatusUseCase,
    hold_credit::HoldCreditUseCase, hold_debit::HoldDebitUseCase, open_group::OpenGroupUseCase,
    reconciliation::ReconciliationUseCase, refund::RefundUseCase,
    register_wallet::RegisterWalletUseCase, release_group::ReleaseGroupUseCase,
    settle_group::SettleGroupUseCase, transfer::TransferUseCase, wallet_entries::WalletEntriesUseCase,
};

/// Estado compartido de la aplicación: un caso de uso por operación,
/// todos baratos de clonar (cada uno envuelve un `Arc<dyn JournalStore>`).
pub struct AppState {
    pub pool: PgPool,
    pub register_wallet_use_case: RegisterWalletUseCase,
    pub wallet_entries_use_case: WalletEntriesUseCase,
    pub balance_calculator: BalanceCalculator,
    pub open_group_use_case: OpenGroupUseCase,
    pub group_status_use_case: GroupStatusUseCase,
    pub group_entries_use_case: GroupEntriesUseCase,
    pub hold_debit_use_case: HoldDebitUseCase,
    pub hold_credit_use_case: HoldCreditUseCase,
    pub settle_group_use_case: SettleGroupUseCase,
    pub release_group_use_case: ReleaseGroupUseCase,
    pub cancel_group_use_case: CancelGroupUseCase,
    pub refund_use_case: RefundUseCase,
    pub transfer_use_case: TransferUseCase,
    pub reconciliation_use_case: ReconciliationUseCase,
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/wallets", post(create_wallet))
        .route("/wallets/{id}", get(get_wallet_details))
        .route("/wallets/{id}/entries", get(get_wallet_entries))
        .route("/groups", post(open_group))
        .route("/groups/{id}", get(get_group_status))
        .route("/groups/{id}/entries", get(get_group_entries))
        .route("/groups/{id}/holds/debit", post(hold_debit))
        .route("/groups/{id}/holds/credit", post(hold_credit))
        .route("/groups/{id}/settle", post(settle_group))
        .route("/groups/{id}/release", post(release_group))
        .route("/groups/{id}/cancel", post(cancel_group))
        .route("/groups/{id}/refund", post(refund))
        .route("/transfer", post(transfer))
        .route("/reconciliation", get(reconciliation))
        .with_state(state)
}

// GET /healthz
pub async fn healthz(State(state): State<Arc<AppState>>) -> StatusCode {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!("healthz DB ping failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[derive(Deserialize)]
pub struct CreateWalletRequest {
    pub kind: WalletKind,
    pub currency: String,
    pub owner_id: Option<String>,
    pub description: String,
}

// POST /wallets
pub async fn create_wallet(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateWalletRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let currency = Currency::parse(&payload.currency)
        .map_err(|e| crate::domain::error::EngineError::Validation(e.to_string()))?;
    let wallet = state
        .register_wallet_use_case
        .execute(payload.kind, currency, payload.owner_id, payload.description)
        .await?;
    Ok(Json(serde_json::to_value(ApiResponse::success(wallet)).unwrap()))
}

// GET /wallets/{id}
pub async fn get_wallet_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let wallet_id = WalletId(id);
    let wallet = state.register_wallet_use_case.find(wallet_id).await?;
    let available = state.balance_calculator.available_balance(wallet_id).await?;
    let confirmed = state.balance_calculator.confirmed_balance(wallet_id).await?;
    let reserved = state.balance_calculator.reserved_balance(wallet_id).await?;

    Ok(Json(serde_json::to_value(ApiResponse::success(serde_json::json!({
        "wallet": wallet,
        "confirmedBalance": confirmed,
        "availableBalance": available,
        "reservedBalance": reserved,
    })))
    .unwrap()))
}

#[derive(Deserialize)]
pub struct WalletEntriesQuery {
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

// GET /wallets/{id}/entries
pub async fn get_wallet_entries(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<WalletEntriesQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let page = state
        .wallet_entries_use_case
        .execute(WalletId(id), query.cursor, query.limit.unwrap_or(50))
        .await?;
    Ok(Json(serde_json::to_value(ApiResponse::success(page)).unwrap()))
}

#[derive(Deserialize)]
pub struct OpenGroupRequest {
    pub idempotency_key: Option<String>,
}

// POST /groups
pub async fn open_group(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<OpenGroupRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let key = payload.idempotency_key.and_then(crate::domain::types::CorrelationKey::new);
    let group = state.open_group_use_case.execute(key).await?;
    Ok(Json(serde_json::to_value(ApiResponse::success(group)).unwrap()))
}

// GET /groups/{id}
pub async fn get_group_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let group = state.group_status_use_case.execute(GroupId(id)).await?;
    Ok(Json(serde_json::to_value(ApiResponse::success(group)).unwrap()))
}

// GET /groups/{id}/entries
pub async fn get_group_entries(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let entries = state.group_entries_use_case.execute(GroupId(id)).await?;
    Ok(Json(serde_json::to_value(ApiResponse::success(entries)).unwrap()))
}

#[derive(Deserialize)]
pub struct HoldRequest {
    pub wallet_id: Uuid,
    pub amount: i64,
}

#[derive(serde::Serialize)]
pub struct EntryIdBody {
    entry_id: EntryId,
}

impl From<EntryId> for EntryIdBody {
    fn from(entry_id: EntryId) -> Self {
        Self { entry_id }
    }
}

// POST /groups/{id}/holds/debit
pub async fn hold_debit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<HoldRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let entry_id = state
        .hold_debit_use_case
        .execute(WalletId(payload.wallet_id), payload.amount, GroupId(id))
        .await?;
    Ok(Json(serde_json::to_value(ApiResponse::success(EntryIdBody::from(entry_id))).unwrap()))
}

// POST /groups/{id}/holds/credit
pub async fn hold_credit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<HoldRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let entry_id = state
        .hold_credit_use_case
        .execute(WalletId(payload.wallet_id), payload.amount, GroupId(id))
        .await?;
    Ok(Json(serde_json::to_value(ApiResponse::success(EntryIdBody::from(entry_id))).unwrap()))
}

// POST /groups/{id}/settle
pub async fn settle_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let entries = state.settle_group_use_case.execute(GroupId(id)).await?;
    Ok(Json(serde_json::to_value(ApiResponse::success(entries)).unwrap()))
}

#[derive(Deserialize)]
pub struct ReasonRequest {
    pub reason: String,
}

// POST /groups/{id}/release
pub async fn release_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReasonRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let entries = state
        .release_group_use_case
        .execute(GroupId(id), payload.reason)
        .await?;
    Ok(Json(serde_json::to_value(ApiResponse::success(entries)).unwrap()))
}

// POST /groups/{id}/cancel
pub async fn cancel_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReasonRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let entries = state
        .cancel_group_use_case
        .execute(GroupId(id), payload.reason)
        .await?;
    Ok(Json(serde_json::to_value(ApiResponse::success(entries)).unwrap()))
}

#[derive(Deserialize)]
pub struct RefundRequest {
    pub source_id: Uuid,
    pub dest_id: Uuid,
    pub amount: i64,
    #[serde(default)]
    pub allow_negative: bool,
}

// POST /groups/{id}/refund
pub async fn refund(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RefundRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (debit, credit) = state
        .refund_use_case
        .execute(
            GroupId(id),
            WalletId(payload.source_id),
            WalletId(payload.dest_id),
            payload.amount,
            payload.allow_negative,
        )
        .await?;
    Ok(Json(serde_json::to_value(ApiResponse::success((debit, credit))).unwrap()))
}

#[derive(Deserialize)]
pub struct TransferRequest {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub amount: i64,
    pub idempotency_key: Option<String>,
}

// POST /transfer
pub async fn transfer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TransferRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let key = payload.idempotency_key.and_then(crate::domain::types::CorrelationKey::new);
    let group_id = state
        .transfer_use_case
        .execute(WalletId(payload.sender_id), WalletId(payload.recipient_id), payload.amount, key)
        .await?;
    Ok(Json(serde_json::to_value(ApiResponse::success(serde_json::json!({
        "groupId": group_id.to_string(),
    })))
    .unwrap()))
}

// GET /reconciliation
pub async fn reconciliation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let report = state.reconciliation_use_case.execute().await?;
    Ok(Json(serde_json::to_value(ApiResponse::success(report)).unwrap()))
}
