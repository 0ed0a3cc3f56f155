use anyhow::Context;
use axum::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SearchHistory {
    pub id: i64,
    pub user_id: Uuid,
    pub query: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Per-user search history. Every method is scoped by `user_id`.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Most recent entries first.
    async fn list_recent(&self, user_id: Uuid, limit: i64) -> anyhow::Result<Vec<SearchHistory>>;
    /// Stores `query` stamped now, dropping any older entry with the same text.
    async fn record(&self, user_id: Uuid, query: &str) -> anyhow::Result<SearchHistory>;
    /// Returns false when no entry with that id belongs to the user.
    async fn delete(&self, user_id: Uuid, id: i64) -> anyhow::Result<bool>;
    async fn clear(&self, user_id: Uuid) -> anyhow::Result<u64>;
}

#[derive(Clone)]
pub struct PgHistoryStore {
    db: PgPool,
}

impl PgHistoryStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn list_recent(&self, user_id: Uuid, limit: i64) -> anyhow::Result<Vec<SearchHistory>> {
        let rows = sqlx::query_as::<_, SearchHistory>(
            r#"
            SELECT id, user_id, query, "timestamp", created_at
              FROM search_history
             WHERE user_id = $1
             ORDER BY "timestamp" DESC, id DESC
             LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .context("list search history")?;
        Ok(rows)
    }

    async fn record(&self, user_id: Uuid, query: &str) -> anyhow::Result<SearchHistory> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        sqlx::query(r#"DELETE FROM search_history WHERE user_id = $1 AND query = $2"#)
            .bind(user_id)
            .bind(query)
            .execute(&mut *tx)
            .await
            .context("drop duplicate history")?;

        let row = sqlx::query_as::<_, SearchHistory>(
            r#"
            INSERT INTO search_history (user_id, query, "timestamp")
            VALUES ($1, $2, now())
            RETURNING id, user_id, query, "timestamp", created_at
            "#,
        )
        .bind(user_id)
        .bind(query)
        .fetch_one(&mut *tx)
        .await
        .context("insert history")?;

        tx.commit().await.context("commit tx")?;
        Ok(row)
    }

    async fn delete(&self, user_id: Uuid, id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM search_history WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete history")?;
        Ok(res.rows_affected() > 0)
    }

    async fn clear(&self, user_id: Uuid) -> anyhow::Result<u64> {
        let res = sqlx::query(r#"DELETE FROM search_history WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("clear history")?;
        Ok(res.rows_affected())
    }
}
