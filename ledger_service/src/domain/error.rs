use thiserror::Error;

use crate::domain::types::{GroupId, WalletId};

/// Taxonomía de errores del motor (spec §7). Cada variante corresponde a un
/// "kind" surfaceado al llamador, no a un tipo de transporte concreto —
/// `api::error::ApiError` se encarga de mapear esto a HTTP/gRPC.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Entrada malformada, violación signo-tipo, monto no positivo, transición
    /// de estado desconocida. Local, no reintentable.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("wallet not found: {0}")]
    WalletNotFound(WalletId),

    #[error("group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("insufficient funds in wallet: {0}")]
    InsufficientFunds(WalletId),

    /// Operación no legal para el estado actual (p. ej. settle sobre un grupo terminal).
    #[error("illegal state transition: {0}")]
    State(String),

    #[error("group {0} does not balance to zero at settle time")]
    ZeroSum(GroupId),

    /// Violación de invariante detectada por el pipeline (conteo no coincide,
    /// ruptura de inmutabilidad). Fatal: detiene la operación; se espera que
    /// ya haya hecho rollback.
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// Falla subyacente de E/S. Reintentable a discreción del llamador.
    #[error("transient error: {0}")]
    Transient(String),
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        EngineError::Transient(err.to_string())
    }
}
