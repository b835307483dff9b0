use serde::{Deserialize, Serialize};

/// Página de resultados para lecturas paginadas (spec §4.1: `entriesOfWallet`
/// es paginado). `next_cursor` es `None` cuando no hay más resultados.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self { items, next_cursor }
    }
}
