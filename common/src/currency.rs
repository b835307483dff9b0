use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("currency must be a 3-letter ISO-4217 code, got '{0}'")]
pub struct InvalidCurrency(pub String);

/// Código de divisa ISO-4217, validado en construcción. Una vez creado,
/// siempre es una cadena de 3 letras mayúsculas.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, InvalidCurrency> {
        let raw = raw.as_ref().trim();
        if raw.len() != 3 || !raw.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(InvalidCurrency(raw.to_string()));
        }
        Ok(Self(raw.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
