use tonic::{Request, Response, Status};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::proto::ledger::ledger_service_server::LedgerService as LedgerServiceTrait;
use crate::api::proto::ledger::{
    BalanceResponse, EntryListResponse, FinalizeGroupRequest, GroupIdRequest, GroupStatusResponse,
    HoldRequest, HoldResponse, OpenGroupRequest, OpenGroupResponse, RefundRequest, RefundResponse,
    TransferRequest, WalletIdRequest,
};
use crate::domain::entities::TransactionEntry;
use crate::domain::types::{CorrelationKey, GroupId, WalletId};
use crate::use_cases::balance_calculator::BalanceCalculator;
use crate::use_cases::cancel_group::CancelGroupUseCase;
use crate::use_cases::group_status::GroupStatusUseCase;
use crate::use_cases::hold_credit::HoldCreditUseCase;
use crate::use_cases::hold_debit::HoldDebitUseCase;
use crate::use_cases::open_group::OpenGroupUseCase;
use crate::use_cases::refund::RefundUseCase;
use crate::use_cases::release_group::ReleaseGroupUseCase;
use crate::use_cases::settle_group::SettleGroupUseCase;
use crate::use_cases::transfer::TransferUseCase;

/// Servidor gRPC del motor, usado por colaboradores internos que prefieren
/// Protobuf sobre HTTP/JSON (misma doble exposición que el par
/// wallet/transaction del teacher, ahora sobre un único bounded context).
pub struct LedgerGrpcService {
    open_group_use_case: OpenGroupUseCase,
    hold_debit_use_case: HoldDebitUseCase,
    hold_credit_use_case: HoldCreditUseCase,
    settle_group_use_case: SettleGroupUseCase,
    release_group_use_case: ReleaseGroupUseCase,
    cancel_group_use_case: CancelGroupUseCase,
    transfer_use_case: TransferUseCase,
    refund_use_case: RefundUseCase,
    group_status_use_case: GroupStatusUseCase,
    balance_calculator: BalanceCalculator,
}

impl LedgerGrpcService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        open_group_use_case: OpenGroupUseCase,
        hold_debit_use_case: HoldDebitUseCase,
        hold_credit_use_case: HoldCreditUseCase,
        settle_group_use_case: SettleGroupUseCase,
        release_group_use_case: ReleaseGroupUseCase,
        cancel_group_use_case: CancelGroupUseCase,
        transfer_use_case: TransferUseCase,
        refund_use_case: RefundUseCase,
        group_status_use_case: GroupStatusUseCase,
        balance_calculator: BalanceCalculator,
    ) -> Self {
        Self {
            open_group_use_case,
            hold_debit_use_case,
            hold_credit_use_case,
            settle_group_use_case,
            release_group_use_case,
            cancel_group_use_case,
            transfer_use_case,
            refund_use_case,
            group_status_use_case,
            balance_calculator,
        }
    }
}

fn parse_uuid(raw: &str, field: &str) -> Result<Uuid, Status> {
    Uuid::parse_str(raw).map_err(|_| Status::invalid_argument(format!("invalid uuid for {field}")))
}

fn entries_to_proto(entries: Vec<TransactionEntry>) -> EntryListResponse {
    EntryListResponse {
        entries: entries
            .into_iter()
            .map(|e| crate::api::proto::ledger::Entry {
                entry_id: e.id().0,
                wallet_id: e.wallet_id().to_string(),
                entry_type: format!("{:?}", e.entry_type()).to_uppercase(),
                status: format!("{:?}", e.status()).to_uppercase(),
                amount: e.amount(),
            })
            .collect(),
    }
}

#[tonic::async_trait]
impl LedgerServiceTrait for LedgerGrpcService {
    async fn open_group(
        &self,
        request: Request<OpenGroupRequest>,
    ) -> Result<Response<OpenGroupResponse>, Status> {
        let req = request.into_inner();
        let key = req.idempotency_key.and_then(CorrelationKey::new);
        let group = self
            .open_group_use_case
            .execute(key)
            .await
            .map_err(ApiError)?;
        Ok(Response::new(OpenGroupResponse {
            group_id: group.id().to_string(),
        }))
    }

    async fn hold_debit(&self, request: Request<HoldRequest>) -> Result<Response<HoldResponse>, Status> {
        let req = request.into_inner();
        let wallet_id = WalletId(parse_uuid(&req.wallet_id, "wallet_id")?);
        let group_id = GroupId(parse_uuid(&req.group_id, "group_id")?);
        let entry_id = self
            .hold_debit_use_case
            .execute(wallet_id, req.amount, group_id)
            .await
            .map_err(ApiError)?;
        Ok(Response::new(HoldResponse { entry_id: entry_id.0 }))
    }

    async fn hold_credit(&self, request: Request<HoldRequest>) -> Result<Response<HoldResponse>, Status> {
        let req = request.into_inner();
        let wallet_id = WalletId(parse_uuid(&req.wallet_id, "wallet_id")?);
        let group_id = GroupId(parse_uuid(&req.group_id, "group_id")?);
        let entry_id = self
            .hold_credit_use_case
            .execute(wallet_id, req.amount, group_id)
            .await
            .map_err(ApiError)?;
        Ok(Response::new(HoldResponse { entry_id: entry_id.0 }))
    }

    async fn settle_group(
        &self,
        request: Request<GroupIdRequest>,
    ) -> Result<Response<EntryListResponse>, Status> {
        let req = request.into_inner();
        let group_id = GroupId(parse_uuid(&req.group_id, "group_id")?);
        let entries = self
            .settle_group_use_case
            .execute(group_id)
            .await
            .map_err(ApiError)?;
        Ok(Response::new(entries_to_proto(entries)))
    }

    async fn release_group(
        &self,
        request: Request<FinalizeGroupRequest>,
    ) -> Result<Response<EntryListResponse>, Status> {
        let req = request.into_inner();
        let group_id = GroupId(parse_uuid(&req.group_id, "group_id")?);
        let entries = self
            .release_group_use_case
            .execute(group_id, req.reason)
            .await
            .map_err(ApiError)?;
        Ok(Response::new(entries_to_proto(entries)))
    }

    async fn cancel_group(
        &self,
        request: Request<FinalizeGroupRequest>,
    ) -> Result<Response<EntryListResponse>, Status> {
        let req = request.into_inner();
        let group_id = GroupId(parse_uuid(&req.group_id, "group_id")?);
        let entries = self
            .cancel_group_use_case
            .execute(group_id, req.reason)
            .await
            .map_err(ApiError)?;
        Ok(Response::new(entries_to_proto(entries)))
    }

    async fn transfer(
        &self,
        request: Request<TransferRequest>,
    ) -> Result<Response<OpenGroupResponse>, Status> {
        let req = request.into_inner();
        let sender = WalletId(parse_uuid(&req.sender_id, "sender_id")?);
        let recipient = WalletId(parse_uuid(&req.recipient_id, "recipient_id")?);
        let key = req.idempotency_key.and_then(CorrelationKey::new);
        let group_id = self
            .transfer_use_case
            .execute(sender, recipient, req.amount, key)
            .await
            .map_err(ApiError)?;
        Ok(Response::new(OpenGroupResponse {
            group_id: group_id.to_string(),
        }))
    }

    async fn refund(&self, request: Request<RefundRequest>) -> Result<Response<RefundResponse>, Status> {
        let req = request.into_inner();
        let group_id = GroupId(parse_uuid(&req.group_id, "group_id")?);
        let source_id = WalletId(parse_uuid(&req.source_id, "source_id")?);
        let dest_id = WalletId(parse_uuid(&req.dest_id, "dest_id")?);
        let (debit, credit) = self
            .refund_use_case
            .execute(group_id, source_id, dest_id, req.amount, req.allow_negative)
            .await
            .map_err(ApiError)?;
        Ok(Response::new(RefundResponse {
            debit_entry_id: debit.id().0,
            credit_entry_id: credit.id().0,
        }))
    }

    async fn group_status(
        &self,
        request: Request<GroupIdRequest>,
    ) -> Result<Response<GroupStatusResponse>, Status> {
        let req = request.into_inner();
        let group_id = GroupId(parse_uuid(&req.group_id, "group_id")?);
        let group = self
            .group_status_use_case
            .execute(group_id)
            .await
            .map_err(ApiError)?;
        Ok(Response::new(GroupStatusResponse {
            status: format!("{:?}", group.status()).to_uppercase(),
        }))
    }

    async fn available_balance(
        &self,
        request: Request<WalletIdRequest>,
    ) -> Result<Response<BalanceResponse>, Status> {
        let req = request.into_inner();
        let wallet_id = WalletId(parse_uuid(&req.wallet_id, "wallet_id")?);
        let amount = self
            .balance_calculator
            .available_balance(wallet_id)
            .await
            .map_err(ApiError)?;
        Ok(Response::new(BalanceResponse { amount }))
    }
}
