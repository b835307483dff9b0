use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::Page;
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};

use crate::domain::entities::{
    NewTransactionEntry, TransactionEntry, TransactionGroup, Wallet,
};
use crate::domain::error::EngineError;
use crate::domain::repository::JournalStore;
use crate::domain::types::{
    CorrelationKey, EntryId, EntryStatus, EntryType, GroupId, GroupStatus, ReconciliationReport,
    TerminalStatus, WalletEntryCursor, WalletId,
};
use crate::infrastructure::persistence::models::{EntryRow, GroupRow, WalletRow};

/// Adaptador Postgres del puerto `JournalStore` (C1).
///
/// Cada método de alto nivel (settle/finalize/refund/pipeline) es dueño de
/// su propia transacción de principio a fin, en vez de exponer pasos
/// individuales a través del puerto — así la atomicidad exigida por §4.2 y
/// §4.5 es estructural, no un acuerdo entre el llamador y el adaptador.
pub struct PostgresJournalStore {
    pool: PgPool,
}

impl PostgresJournalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lock_wallet<'c>(
        tx: &mut Transaction<'c, Postgres>,
        wallet_id: WalletId,
    ) -> Result<WalletRow, EngineError> {
        sqlx::query_as::<_, WalletRow>("SELECT * FROM wallet WHERE id = $1 FOR UPDATE")
            .bind(wallet_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(EngineError::WalletNotFound(wallet_id))
    }

    async fn lock_group<'c>(
        tx: &mut Transaction<'c, Postgres>,
        group_id: GroupId,
    ) -> Result<GroupRow, EngineError> {
        sqlx::query_as::<_, GroupRow>("SELECT * FROM transaction_group WHERE id = $1 FOR UPDATE")
            .bind(group_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(EngineError::GroupNotFound(group_id))
    }

    /// Open Question #2 resuelta: un grupo es de una sola divisa. Se valida
    /// comparando contra la primera entrada ya sostenida en el grupo, si existe.
    async fn assert_single_currency<'c>(
        tx: &mut Transaction<'c, Postgres>,
        group_id: GroupId,
        wallet: &WalletRow,
    ) -> Result<(), EngineError> {
        let existing_currency: Option<crate::domain::types::Currency> = sqlx::query_scalar(
            r#"
            SELECT w.currency FROM transaction_entry e
            JOIN wallet w ON w.id = e.wallet_id
            WHERE e.group_id = $1
            ORDER BY e.id
            LIMIT 1
            "#,
        )
        .bind(group_id)
        .fetch_optional(&mut **tx)
        .await?;

        if let Some(currency) = existing_currency {
            if currency != *wallet.currency() {
                return Err(EngineError::Validation(format!(
                    "group {group_id} is constrained to currency {currency}, got {}",
                    wallet.currency()
                )));
            }
        }
        Ok(())
    }

    /// Inserta en la tier activa (`transaction_entry`), que no tiene columnas
    /// `is_ledger_entry`/`snapshot_date` — nunca aloja checkpoints de ledger.
    async fn insert_entry<'c>(
        tx: &mut Transaction<'c, Postgres>,
        table: &str,
        draft: &NewTransactionEntry,
    ) -> Result<EntryRow, sqlx::Error> {
        debug_assert!(!draft.is_ledger_entry, "LEDGER checkpoints never land in the active tier");
        let sql = format!(
            r#"
            INSERT INTO {table} (
                wallet_id, group_id, entry_type, status, amount,
                hold_timestamp, finalize_timestamp, description, correlation_key
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, wallet_id, group_id, entry_type, status, amount,
                      hold_timestamp, finalize_timestamp, description,
                      false AS is_ledger_entry, correlation_key, NULL::timestamptz AS snapshot_date
            "#
        );
        sqlx::query_as::<_, EntryRow>(&sql)
            .bind(draft.wallet_id)
            .bind(draft.group_id)
            .bind(draft.entry_type)
            .bind(draft.status)
            .bind(draft.amount)
            .bind(draft.hold_timestamp)
            .bind(draft.finalize_timestamp)
            .bind(&draft.description)
            .bind(draft.correlation_key.as_ref().map(CorrelationKey::as_str))
            .fetch_one(&mut **tx)
            .await
    }

    /// Inserta en `transaction_entry_snapshot`, que sí tiene `is_ledger_entry`
    /// y `snapshot_date` (es la única tabla que recibe checkpoints LEDGER).
    async fn insert_snapshot_entry<'c>(
        tx: &mut Transaction<'c, Postgres>,
        draft: &NewTransactionEntry,
    ) -> Result<EntryRow, sqlx::Error> {
        sqlx::query_as::<_, EntryRow>(
            r#"
            INSERT INTO transaction_entry_snapshot (
                wallet_id, group_id, entry_type, status, amount,
                hold_timestamp, finalize_timestamp, description,
                is_ledger_entry, correlation_key, snapshot_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, wallet_id, group_id, entry_type, status, amount,
                      hold_timestamp, finalize_timestamp, description,
                      is_ledger_entry, correlation_key, snapshot_date
            "#,
        )
        .bind(draft.wallet_id)
        .bind(draft.group_id)
        .bind(draft.entry_type)
        .bind(draft.status)
        .bind(draft.amount)
        .bind(draft.hold_timestamp)
        .bind(draft.finalize_timestamp)
        .bind(&draft.description)
        .bind(draft.is_ledger_entry)
        .bind(draft.correlation_key.as_ref().map(CorrelationKey::as_str))
        .bind(draft.finalize_timestamp)
        .fetch_one(&mut **tx)
        .await
    }

    async fn set_group_terminal<'c>(
        tx: &mut Transaction<'c, Postgres>,
        group_id: GroupId,
        target: GroupStatus,
        reason: Option<String>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE transaction_group
            SET status = $1, finalized_at = now(), reason = $2
            WHERE id = $3
            "#,
        )
        .bind(target)
        .bind(reason)
        .bind(group_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn active_holds_for_group<'c>(
        tx: &mut Transaction<'c, Postgres>,
        group_id: GroupId,
    ) -> Result<Vec<EntryRow>, sqlx::Error> {
        sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT id, wallet_id, group_id, entry_type, status, amount,
                   hold_timestamp, finalize_timestamp, description,
                   false AS is_ledger_entry, correlation_key, NULL::timestamptz AS snapshot_date
            FROM transaction_entry
            WHERE group_id = $1 AND status = 'HOLD'
            ORDER BY id
            "#,
        )
        .bind(group_id)
        .fetch_all(&mut **tx)
        .await
    }

    async fn confirmed_balance_sql<'e, E>(executor: E, wallet_id: WalletId) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(amount), 0) FROM (
                SELECT amount FROM transaction_entry WHERE wallet_id = $1 AND status = 'SETTLED'
                UNION ALL
                SELECT amount FROM transaction_entry_snapshot WHERE wallet_id = $1 AND status = 'SETTLED'
            ) t
            "#,
        )
        .bind(wallet_id)
        .fetch_one(executor)
        .await
    }

    async fn held_debit_amount_sql<'e, E>(executor: E, wallet_id: WalletId) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let signed_sum: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(e.amount), 0)
            FROM transaction_entry e
            JOIN transaction_group g ON g.id = e.group_id
            WHERE e.wallet_id = $1 AND e.status = 'HOLD' AND e.entry_type = 'DEBIT'
              AND g.status = 'IN_PROGRESS'
            "#,
        )
        .bind(wallet_id)
        .fetch_one(executor)
        .await?;
        Ok(signed_sum.unsigned_abs() as i64)
    }

    async fn reserved_balance_sql<'e, E>(executor: E, wallet_id: WalletId) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(e.amount), 0)
            FROM transaction_entry e
            JOIN transaction_group g ON g.id = e.group_id
            WHERE e.wallet_id = $1 AND e.status = 'HOLD' AND e.entry_type = 'CREDIT'
              AND g.status = 'IN_PROGRESS'
            "#,
        )
        .bind(wallet_id)
        .fetch_one(executor)
        .await
    }
}

#[async_trait]
impl JournalStore for PostgresJournalStore {
    async fn register_wallet(&self, wallet: Wallet) -> Result<Wallet, EngineError> {
        let row = sqlx::query_as::<_, WalletRow>(
            r#"
            INSERT INTO wallet (id, kind, currency, owner_id, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(wallet.id())
        .bind(wallet.kind())
        .bind(wallet.currency())
        .bind(wallet.owner_id())
        .bind(wallet.description())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_wallet(&self, id: WalletId) -> Result<Option<Wallet>, EngineError> {
        let row = sqlx::query_as::<_, WalletRow>("SELECT * FROM wallet WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn list_wallet_ids(&self) -> Result<Vec<WalletId>, EngineError> {
        let ids = sqlx::query_scalar::<_, WalletId>("SELECT id FROM wallet ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn create_group(
        &self,
        idempotency_key: Option<CorrelationKey>,
    ) -> Result<TransactionGroup, EngineError> {
        if let Some(ref key) = idempotency_key {
            let existing = sqlx::query_as::<_, GroupRow>(
                "SELECT * FROM transaction_group WHERE idempotency_key = $1",
            )
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await?;
            if let Some(row) = existing {
                return Ok(row.into());
            }
        }

        let group = TransactionGroup::open(idempotency_key);
        let row = sqlx::query_as::<_, GroupRow>(
            r#"
            INSERT INTO transaction_group (id, status, created_at, finalized_at, reason, idempotency_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(group.id())
        .bind(group.status())
        .bind(group.created_at())
        .bind(group.finalized_at())
        .bind(group.reason())
        .bind(group.idempotency_key().map(CorrelationKey::as_str))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Carrera con otra petición usando la misma idempotency_key: el
            // índice único parcial rechaza el insert; el llamador debe
            // reintentar la búsqueda, no tratarlo como un fallo de validación.
            EngineError::Transient(e.to_string())
        })?;
        Ok(row.into())
    }

    async fn get_group(&self, id: GroupId) -> Result<TransactionGroup, EngineError> {
        sqlx::query_as::<_, GroupRow>("SELECT * FROM transaction_group WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Into::into)
            .ok_or(EngineError::GroupNotFound(id))
    }

    async fn hold_debit(
        &self,
        wallet_id: WalletId,
        amount: i64,
        group_id: GroupId,
    ) -> Result<TransactionEntry, EngineError> {
        let mut tx = self.pool.begin().await?;

        let wallet = Self::lock_wallet(&mut tx, wallet_id).await?;
        let group = Self::lock_group(&mut tx, group_id).await?;
        if group.status != GroupStatus::InProgress {
            return Err(EngineError::State(format!("group {group_id} is not open for holds")));
        }
        Self::assert_single_currency(&mut tx, group_id, &wallet).await?;

        let confirmed = Self::confirmed_balance_sql(&mut *tx, wallet_id).await?;
        let held_debit = Self::held_debit_amount_sql(&mut *tx, wallet_id).await?;
        let available = confirmed - held_debit;
        if available < amount {
            return Err(EngineError::InsufficientFunds(wallet_id));
        }

        let draft = NewTransactionEntry::hold(wallet_id, group_id, EntryType::Debit, amount, "hold debit".into())?;
        let row = Self::insert_entry(&mut tx, "transaction_entry", &draft).await?;
        tx.commit().await?;
        Ok(row.into())
    }

    async fn hold_credit(
        &self,
        wallet_id: WalletId,
        amount: i64,
        group_id: GroupId,
    ) -> Result<TransactionEntry, EngineError> {
        let mut tx = self.pool.begin().await?;

        let wallet = Self::lock_wallet(&mut tx, wallet_id).await?;
        let group = Self::lock_group(&mut tx, group_id).await?;
        if group.status != GroupStatus::InProgress {
            return Err(EngineError::State(format!("group {group_id} is not open for holds")));
        }
        Self::assert_single_currency(&mut tx, group_id, &wallet).await?;

        let draft = NewTransactionEntry::hold(wallet_id, group_id, EntryType::Credit, amount, "hold credit".into())?;
        let row = Self::insert_entry(&mut tx, "transaction_entry", &draft).await?;
        tx.commit().await?;
        Ok(row.into())
    }

    async fn settle_group(&self, group_id: GroupId) -> Result<Vec<TransactionEntry>, EngineError> {
        let mut tx = self.pool.begin().await?;

        let group = Self::lock_group(&mut tx, group_id).await?;
        if group.status != GroupStatus::InProgress {
            return Err(EngineError::State(format!("group {group_id} is already terminal")));
        }

        let holds = Self::active_holds_for_group(&mut tx, group_id).await?;
        let sum: i64 = holds.iter().map(|h| h.amount).sum();
        if sum != 0 {
            // No se escribió nada todavía; el rollback implícito al descartar
            // `tx` sin commit deja el grupo IN_PROGRESS como exige la spec.
            return Err(EngineError::ZeroSum(group_id));
        }

        let mut holds: Vec<TransactionEntry> = holds.into_iter().map(Into::into).collect();
        holds.sort_by_key(|e| std::cmp::Reverse(e.id()));

        let mut settled = Vec::with_capacity(holds.len());
        for hold in &holds {
            let draft = NewTransactionEntry::finalizing(hold, EntryStatus::Settled);
            let row = Self::insert_entry(&mut tx, "transaction_entry", &draft).await?;
            settled.push(row.into());
        }

        Self::set_group_terminal(&mut tx, group_id, GroupStatus::Settled, None).await?;
        tx.commit().await?;
        Ok(settled)
    }

    async fn finalize_group(
        &self,
        group_id: GroupId,
        target_status: TerminalStatus,
        reason: Option<String>,
    ) -> Result<Vec<TransactionEntry>, EngineError> {
        let mut tx = self.pool.begin().await?;

        let group = Self::lock_group(&mut tx, group_id).await?;
        if group.status != GroupStatus::InProgress {
            return Err(EngineError::State(format!("group {group_id} is already terminal")));
        }

        let holds = Self::active_holds_for_group(&mut tx, group_id).await?;
        let mut holds: Vec<TransactionEntry> = holds.into_iter().map(Into::into).collect();
        holds.sort_by_key(|e| std::cmp::Reverse(e.id()));

        let mut produced = Vec::with_capacity(holds.len());
        for hold in &holds {
            let draft = NewTransactionEntry::finalizing(hold, target_status.as_entry_status());
            let row = Self::insert_entry(&mut tx, "transaction_entry", &draft).await?;
            produced.push(row.into());
        }

        Self::set_group_terminal(&mut tx, group_id, target_status.as_group_status(), reason).await?;
        tx.commit().await?;
        Ok(produced)
    }

    async fn refund(
        &self,
        group_id: GroupId,
        source_wallet_id: WalletId,
        dest_wallet_id: WalletId,
        amount: i64,
        allow_negative: bool,
    ) -> Result<(TransactionEntry, TransactionEntry), EngineError> {
        let mut tx = self.pool.begin().await?;

        let group = Self::lock_group(&mut tx, group_id).await?;
        if group.status != GroupStatus::InProgress {
            return Err(EngineError::State(format!("group {group_id} is already terminal")));
        }

        Self::lock_wallet(&mut tx, source_wallet_id).await?;
        if Self::find_wallet_row(&mut tx, dest_wallet_id).await?.is_none() {
            return Err(EngineError::WalletNotFound(dest_wallet_id));
        }

        if !allow_negative {
            let confirmed = Self::confirmed_balance_sql(&mut *tx, source_wallet_id).await?;
            let held_debit = Self::held_debit_amount_sql(&mut *tx, source_wallet_id).await?;
            if confirmed - held_debit < amount {
                return Err(EngineError::InsufficientFunds(source_wallet_id));
            }
        }

        let debit_draft = NewTransactionEntry::settled_direct(
            source_wallet_id,
            group_id,
            EntryType::Debit,
            amount,
            "refund debit".into(),
        );
        let credit_draft = NewTransactionEntry::settled_direct(
            dest_wallet_id,
            group_id,
            EntryType::Credit,
            amount,
            "refund credit".into(),
        );
        let debit_row = Self::insert_entry(&mut tx, "transaction_entry", &debit_draft).await?;
        let credit_row = Self::insert_entry(&mut tx, "transaction_entry", &credit_draft).await?;

        Self::set_group_terminal(&mut tx, group_id, GroupStatus::Settled, None).await?;
        tx.commit().await?;
        Ok((debit_row.into(), credit_row.into()))
    }

    async fn entries_of_group(&self, group_id: GroupId) -> Result<Vec<TransactionEntry>, EngineError> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT id, wallet_id, group_id, entry_type, status, amount,
                   hold_timestamp, finalize_timestamp, description,
                   false AS is_ledger_entry, correlation_key, NULL::timestamptz AS snapshot_date
            FROM transaction_entry WHERE group_id = $1
            UNION ALL
            SELECT id, wallet_id, group_id, entry_type, status, amount,
                   hold_timestamp, finalize_timestamp, description,
                   is_ledger_entry, correlation_key, snapshot_date
            FROM transaction_entry_snapshot WHERE group_id = $1
            UNION ALL
            SELECT id, wallet_id, group_id, entry_type, status, amount,
                   hold_timestamp, finalize_timestamp, description,
                   is_ledger_entry, correlation_key, snapshot_date
            FROM transaction_entry_archive WHERE group_id = $1
            ORDER BY id
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn entries_of_wallet(
        &self,
        wallet_id: WalletId,
        cursor: Option<WalletEntryCursor>,
        limit: i64,
    ) -> Result<Page<TransactionEntry>, EngineError> {
        let (after_ts, after_id) = match cursor {
            Some(c) => (Some(c.finalize_timestamp), Some(c.entry_id)),
            None => (None, None),
        };

        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            WITH combined AS (
                SELECT id, wallet_id, group_id, entry_type, status, amount,
                       hold_timestamp, finalize_timestamp, description,
                       false AS is_ledger_entry, correlation_key, NULL::timestamptz AS snapshot_date
                FROM transaction_entry WHERE wallet_id = $1
                UNION ALL
                SELECT id, wallet_id, group_id, entry_type, status, amount,
                       hold_timestamp, finalize_timestamp, description,
                       is_ledger_entry, correlation_key, snapshot_date
                FROM transaction_entry_snapshot WHERE wallet_id = $1
            )
            SELECT * FROM combined
            WHERE ($2::timestamptz IS NULL)
               OR (COALESCE(finalize_timestamp, hold_timestamp), id) > ($2, $3)
            ORDER BY COALESCE(finalize_timestamp, hold_timestamp), id
            LIMIT $4
            "#,
        )
        .bind(wallet_id)
        .bind(after_ts)
        .bind(after_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let next_cursor = rows.last().map(|r| {
            WalletEntryCursor {
                finalize_timestamp: r.finalize_timestamp.unwrap_or(r.hold_timestamp),
                entry_id: r.id,
            }
            .encode()
        });
        let next_cursor = if rows.len() == limit as usize { next_cursor } else { None };

        Ok(Page::new(rows.into_iter().map(Into::into).collect(), next_cursor))
    }

    async fn confirmed_balance(&self, wallet_id: WalletId) -> Result<i64, EngineError> {
        Ok(Self::confirmed_balance_sql(&self.pool, wallet_id).await?)
    }

    async fn held_debit_amount(&self, wallet_id: WalletId) -> Result<i64, EngineError> {
        Ok(Self::held_debit_amount_sql(&self.pool, wallet_id).await?)
    }

    async fn reserved_balance(&self, wallet_id: WalletId) -> Result<i64, EngineError> {
        Ok(Self::reserved_balance_sql(&self.pool, wallet_id).await?)
    }

    async fn reconciliation_sum(&self) -> Result<ReconciliationReport, EngineError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0) FROM (
                SELECT amount FROM transaction_entry
                UNION ALL
                SELECT amount FROM transaction_entry_snapshot
                UNION ALL
                SELECT amount FROM transaction_entry_archive
            ) t
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<(EntryStatus, i64)> = sqlx::query_as(
            r#"
            SELECT status, SUM(amount) FROM (
                SELECT status, amount FROM transaction_entry
                UNION ALL
                SELECT status, amount FROM transaction_entry_snapshot
                UNION ALL
                SELECT status, amount FROM transaction_entry_archive
            ) t
            GROUP BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ReconciliationReport { total, per_status: rows })
    }

    async fn move_active_to_snapshot(&self, wallet_id: WalletId) -> Result<u64, EngineError> {
        let mut tx = self.pool.begin().await?;

        let selected = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT e.id, e.wallet_id, e.group_id, e.entry_type, e.status, e.amount,
                   e.hold_timestamp, e.finalize_timestamp, e.description,
                   false AS is_ledger_entry, e.correlation_key, NULL::timestamptz AS snapshot_date
            FROM transaction_entry e
            JOIN transaction_group g ON g.id = e.group_id
            WHERE e.wallet_id = $1 AND g.status <> 'IN_PROGRESS'
            ORDER BY e.id
            FOR UPDATE OF e
            "#,
        )
        .bind(wallet_id)
        .fetch_all(&mut *tx)
        .await?;

        if selected.is_empty() {
            tx.commit().await?;
            return Ok(0);
        }

        let now = Utc::now();
        let ids: Vec<i64> = selected.iter().map(|r| r.id.0).collect();
        let mut written: u64 = 0;
        for row in &selected {
            sqlx::query(
                r#"
                INSERT INTO transaction_entry_snapshot (
                    id, wallet_id, group_id, entry_type, status, amount,
                    hold_timestamp, finalize_timestamp, description,
                    is_ledger_entry, correlation_key, snapshot_date
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                "#,
            )
            .bind(row.id)
            .bind(row.wallet_id)
            .bind(row.group_id)
            .bind(row.entry_type)
            .bind(row.status)
            .bind(row.amount)
            .bind(row.hold_timestamp)
            .bind(row.finalize_timestamp)
            .bind(&row.description)
            .bind(false)
            .bind(&row.correlation_key)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            written += 1;
        }

        if written as usize != selected.len() {
            return Err(EngineError::Integrity(format!(
                "snapshot migration wrote {written} rows but selected {}",
                selected.len()
            )));
        }

        // Ruta privilegiada y angosta hacia la eliminación, distinguida de un
        // DELETE de aplicación ordinario: el trigger de inmutabilidad exige
        // esta GUC local a la transacción, nunca la relaja en general.
        sqlx::query("SELECT set_config('ledger.allow_pipeline_delete', 'on', true)")
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM transaction_entry WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() as usize != selected.len() {
            return Err(EngineError::Integrity(format!(
                "snapshot migration deleted {} rows but selected {}",
                deleted.rows_affected(),
                selected.len()
            )));
        }

        tx.commit().await?;
        Ok(written)
    }

    async fn consolidate_snapshot(
        &self,
        wallet_id: WalletId,
        cutoff: DateTime<Utc>,
    ) -> Result<Option<EntryId>, EngineError> {
        let mut tx = self.pool.begin().await?;

        let selected = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT id, wallet_id, group_id, entry_type, status, amount,
                   hold_timestamp, finalize_timestamp, description,
                   is_ledger_entry, correlation_key, snapshot_date
            FROM transaction_entry_snapshot
            WHERE wallet_id = $1 AND status = 'SETTLED' AND is_ledger_entry = false
              AND snapshot_date < $2
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(wallet_id)
        .bind(cutoff)
        .fetch_all(&mut *tx)
        .await?;

        if selected.is_empty() {
            tx.commit().await?;
            return Ok(None);
        }

        let cumulative: i64 = selected.iter().map(|r| r.amount).sum();
        let group_ids: HashSet<GroupId> = selected.iter().filter_map(|r| r.group_id).collect();

        let now = Utc::now();
        let checkpoint_draft = NewTransactionEntry::ledger_checkpoint(wallet_id, cumulative, now);
        let checkpoint_row = Self::insert_snapshot_entry(&mut tx, &checkpoint_draft).await?;

        for group_id in &group_ids {
            sqlx::query(
                "INSERT INTO ledger_checkpoint_link (checkpoint_entry_id, group_id) VALUES ($1, $2)",
            )
            .bind(checkpoint_row.id)
            .bind(group_id)
            .execute(&mut *tx)
            .await?;
        }

        let ids: Vec<i64> = selected.iter().map(|r| r.id.0).collect();
        let mut archived: u64 = 0;
        for row in &selected {
            sqlx::query(
                r#"
                INSERT INTO transaction_entry_archive (
                    id, wallet_id, group_id, entry_type, status, amount,
                    hold_timestamp, finalize_timestamp, description,
                    is_ledger_entry, correlation_key, snapshot_date
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                "#,
            )
            .bind(row.id)
            .bind(row.wallet_id)
            .bind(row.group_id)
            .bind(row.entry_type)
            .bind(row.status)
            .bind(row.amount)
            .bind(row.hold_timestamp)
            .bind(row.finalize_timestamp)
            .bind(&row.description)
            .bind(row.is_ledger_entry)
            .bind(&row.correlation_key)
            .bind(row.snapshot_date)
            .execute(&mut *tx)
            .await?;
            archived += 1;
        }

        if archived as usize != selected.len() {
            return Err(EngineError::Integrity(format!(
                "archive migration wrote {archived} rows but selected {}",
                selected.len()
            )));
        }

        sqlx::query("SELECT set_config('ledger.allow_pipeline_delete', 'on', true)")
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM transaction_entry_snapshot WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() as usize != selected.len() {
            return Err(EngineError::Integrity(format!(
                "archive migration deleted {} rows but selected {}",
                deleted.rows_affected(),
                selected.len()
            )));
        }

        tx.commit().await?;
        Ok(Some(checkpoint_row.id))
    }
}

impl PostgresJournalStore {
    async fn find_wallet_row<'c>(
        tx: &mut Transaction<'c, Postgres>,
        wallet_id: WalletId,
    ) -> Result<Option<WalletRow>, sqlx::Error> {
        sqlx::query_as::<_, WalletRow>("SELECT * FROM wallet WHERE id = $1")
            .bind(wallet_id)
            .fetch_optional(&mut **tx)
            .await
    }
}
