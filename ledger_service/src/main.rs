use std::env;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dotenvy::dotenv;
use ledger_service::api::{
    grpc_service::LedgerGrpcService,
    http_routes::{routes, AppState},
    proto::ledger::ledger_service_server::LedgerServiceServer,
};
use ledger_service::domain::repository::JournalStore;
use ledger_service::infrastructure::persistence::postgres_journal_store::PostgresJournalStore;
use ledger_service::jobs::{archive_job::ArchiveJob, snapshot_job::SnapshotJob};
use ledger_service::use_cases::{
    balance_calculator::BalanceCalculator, cancel_group::CancelGroupUseCase,
    group_entries::GroupEntriesUseCase, group_status::GroupStatusUseCase,
    hold_credit::HoldCreditUseCase, hold_debit::HoldDebitUseCase, open_group::OpenGroupUseCase,
    reconciliation::ReconciliationUseCase, refund::RefundUseCase,
    register_wallet::RegisterWalletUseCase, release_group::ReleaseGroupUseCase,
    settle_group::SettleGroupUseCase, transfer::TransferUseCase, wallet_entries::WalletEntriesUseCase,
};
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(paths(
    ledger_service::api::http_routes::create_wallet,
    ledger_service::api::http_routes::get_wallet_details,
    ledger_service::api::http_routes::open_group,
    ledger_service::api::http_routes::transfer,
    ledger_service::api::http_routes::reconciliation
))]
struct ApiDoc;

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Cargar variables de entorno
    dotenv().ok();

    // 2. Configurar Logging/Tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting Ledger Service...");

    // 3. Configurar Conexión a Base de Datos
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    info!("Connected to Database");

    // 4. Instanciar Infraestructura
    let journal: Arc<dyn JournalStore> = Arc::new(PostgresJournalStore::new(pool.clone()));

    // 5. Instanciar Casos de Uso
    let register_wallet_use_case = RegisterWalletUseCase::new(journal.clone());
    let wallet_entries_use_case = WalletEntriesUseCase::new(journal.clone());
    let balance_calculator = BalanceCalculator::new(journal.clone());
    let open_group_use_case = OpenGroupUseCase::new(journal.clone());
    let group_status_use_case = GroupStatusUseCase::new(journal.clone());
    let group_entries_use_case = GroupEntriesUseCase::new(journal.clone());
    let hold_debit_use_case = HoldDebitUseCase::new(journal.clone());
    let hold_credit_use_case = HoldCreditUseCase::new(journal.clone());
    let settle_group_use_case = SettleGroupUseCase::new(journal.clone());
    let release_group_use_case = ReleaseGroupUseCase::new(journal.clone());
    let cancel_group_use_case = CancelGroupUseCase::new(journal.clone());
    let refund_use_case = RefundUseCase::new(journal.clone());
    let transfer_use_case = TransferUseCase::new(journal.clone());
    let reconciliation_use_case = ReconciliationUseCase::new(journal.clone());

    // 6. Configurar Servidor gRPC
    let grpc_host = env::var("GRPC_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let grpc_port = env::var("GRPC_PORT").unwrap_or_else(|_| "50051".to_string());
    let grpc_addr = format!("{}:{}", grpc_host, grpc_port).parse()?;

    let grpc_service = LedgerGrpcService::new(
        open_group_use_case.clone(),
        hold_debit_use_case.clone(),
        hold_credit_use_case.clone(),
        settle_group_use_case.clone(),
        release_group_use_case.clone(),
        cancel_group_use_case.clone(),
        transfer_use_case.clone(),
        refund_use_case.clone(),
        group_status_use_case.clone(),
        balance_calculator.clone(),
    );

    info!("gRPC Server listening on {}", grpc_addr);

    // Ejecutar servidor gRPC en un hilo / tarea separada
    tokio::spawn(async move {
        if let Err(e) = tonic::transport::Server::builder()
            .add_service(LedgerServiceServer::new(grpc_service))
            .serve(grpc_addr)
            .await
        {
            tracing::error!("gRPC server error: {}", e);
        }
    });

    // 7. Programar los jobs de pipeline (C5), con cancelación cooperativa
    let pipeline_cancel = CancellationToken::new();
    let snapshot_interval_secs = env_u64("SNAPSHOT_INTERVAL_SECS", 300);
    let archive_interval_secs = env_u64("ARCHIVE_INTERVAL_SECS", 86_400);
    let archive_retention_days = env_u64("ARCHIVE_RETENTION_DAYS", 30) as i64;

    {
        let journal = journal.clone();
        let cancel = pipeline_cancel.clone();
        tokio::spawn(async move {
            let job = SnapshotJob::new(journal);
            let mut ticker = tokio::time::interval(Duration::from_secs(snapshot_interval_secs));
            loop {
                ticker.tick().await;
                if cancel.is_cancelled() {
                    break;
                }
                job.run(&cancel).await;
            }
        });
    }

    {
        let journal = journal.clone();
        let cancel = pipeline_cancel.clone();
        tokio::spawn(async move {
            let job = ArchiveJob::new(journal);
            let mut ticker = tokio::time::interval(Duration::from_secs(archive_interval_secs));
            loop {
                ticker.tick().await;
                if cancel.is_cancelled() {
                    break;
                }
                let cutoff = Utc::now() - chrono::Duration::days(archive_retention_days);
                job.run(cutoff, &cancel).await;
            }
        });
    }

    // 8. Configurar Estado de la App Axum
    let app_state = Arc::new(AppState {
        pool: pool.clone(),
        register_wallet_use_case,
        wallet_entries_use_case,
        balance_calculator,
        open_group_use_case,
        group_status_use_case,
        group_entries_use_case,
        hold_debit_use_case,
        hold_credit_use_case,
        settle_group_use_case,
        release_group_use_case,
        cancel_group_use_case,
        refund_use_case,
        transfer_use_case,
        reconciliation_use_case,
    });

    // 9. Configurar Rutas y Servidor HTTP
    let app = routes(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    info!("HTTP Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
