//! Postgres-backed question store.
//!
//! The claim transition is a conditional UPDATE guarded on the stored
//! status, so at most one worker wins a pending question no matter how
//! many ticks overlap. Losing invocations see zero affected rows.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domains::questions::models::Question;
use crate::kernel::BaseQuestionStore;

pub struct PgQuestionStore {
    pool: PgPool,
}

impl PgQuestionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseQuestionStore for PgQuestionStore {
    async fn create(&self, question: &Question) -> Result<()> {
        sqlx::query(
            "INSERT INTO questions \
             (id, session_id, question_text, industry, status, answer, created_at, author_token, email, moderation, meta) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(question.id)
        .bind(&question.session_id)
        .bind(&question.question_text)
        .bind(&question.industry)
        .bind(&question.status)
        .bind(&question.answer)
        .bind(question.created_at)
        .bind(&question.author_token)
        .bind(&question.email)
        .bind(&question.moderation)
        .bind(&question.meta)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Question>> {
        let question = sqlx::query_as::<_, Question>("SELECT * FROM questions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(question)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn find_by_session(&self, session_id: &str) -> Result<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(
            "SELECT * FROM questions \
             WHERE session_id = $1 AND status != 'blocked' \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    async fn find_by_author(&self, author_token: &str) -> Result<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(
            "SELECT * FROM questions \
             WHERE author_token = $1 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(author_token)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    async fn find_oldest_pending(&self) -> Result<Option<Question>> {
        let question = sqlx::query_as::<_, Question>(
            "SELECT * FROM questions \
             WHERE status = 'pending' \
             ORDER BY created_at ASC, id ASC \
             LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(question)
    }

    async fn try_claim(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE questions SET status = 'answering' \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn complete_answer(&self, id: Uuid, answer: &str) -> Result<()> {
        sqlx::query(
            "UPDATE questions SET status = 'answered', answer = $2 \
             WHERE id = $1 AND status = 'answering'",
        )
        .bind(id)
        .bind(answer)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn release_claim(&self, id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE questions SET status = 'pending' \
             WHERE id = $1 AND status = 'answering'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
