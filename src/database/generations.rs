//! Generation audit database operations
//!
//! Success and failure records for generation attempts, plus the trailing
//! window count the rate limiter is built on.

use super::models::{GenerationErrorRecord, GenerationRecord};
use super::Database;
use sqlx::Row;

/// Extension trait for generation audit operations
pub trait GenerationOps {
    fn record_generation(&self, record: &GenerationRecord) -> impl std::future::Future<Output = Result<(), sqlx::Error>> + Send;
    fn get_generation(&self, id: &str) -> impl std::future::Future<Output = Result<Option<GenerationRecord>, sqlx::Error>> + Send;
    fn count_user_generations_since(&self, user_id: &str, since: &str) -> impl std::future::Future<Output = Result<u32, sqlx::Error>> + Send;
    fn record_generation_error(&self, record: &GenerationErrorRecord) -> impl std::future::Future<Output = Result<(), sqlx::Error>> + Send;
    fn list_generation_errors(&self, user_id: &str) -> impl std::future::Future<Output = Result<Vec<GenerationErrorRecord>, sqlx::Error>> + Send;
}

impl GenerationOps for Database {
    async fn record_generation(&self, record: &GenerationRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO generations
            (id, user_id, model, source_text_hash, source_text_length, generated_count,
             generation_duration_ms, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.model)
        .bind(&record.source_text_hash)
        .bind(record.source_text_length)
        .bind(record.generated_count)
        .bind(record.generation_duration_ms)
        .bind(&record.created_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn get_generation(&self, id: &str) -> Result<Option<GenerationRecord>, sqlx::Error> {
        sqlx::query_as::<_, GenerationRecord>("SELECT * FROM generations WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await
    }

    /// `since` must be a timestamp from `models::format_timestamp`
    async fn count_user_generations_since(&self, user_id: &str, since: &str) -> Result<u32, sqlx::Error> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM generations WHERE user_id = ? AND created_at >= ?",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(self.pool())
        .await?;

        Ok(row.get::<i64, _>("count") as u32)
    }

    async fn record_generation_error(&self, record: &GenerationErrorRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO generation_error_logs
            (id, user_id, model, error_code, error_message, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.model)
        .bind(&record.error_code)
        .bind(&record.error_message)
        .bind(&record.created_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn list_generation_errors(&self, user_id: &str) -> Result<Vec<GenerationErrorRecord>, sqlx::Error> {
        sqlx::query_as::<_, GenerationErrorRecord>(
            "SELECT * FROM generation_error_logs WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
    }
}
