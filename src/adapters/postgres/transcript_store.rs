//! PostgreSQL implementation of TranscriptStore.
//!
//! Every write runs in a transaction that locks the session row, rebuilds the
//! aggregate, applies the domain rules and then inserts only the new rows.
//! A rejected write therefore rolls back without touching the tables.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::domain::foundation::{
    InsightId, MessageId, SessionId, SessionStatus, Timestamp, UserId,
};
use crate::domain::interrogation::{Insight, Message, MessageRole, RoundCommit, Session};
use crate::ports::{StoreError, TranscriptStore};

/// PostgreSQL implementation of TranscriptStore.
#[derive(Clone)]
pub struct PostgresTranscriptStore {
    pool: PgPool,
}

impl PostgresTranscriptStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads a session inside `tx`, optionally locking its row.
    async fn fetch_session(
        tx: &mut Transaction<'_, Postgres>,
        session_id: &SessionId,
        for_update: bool,
    ) -> Result<Session, StoreError> {
        let sql = if for_update {
            "SELECT id, user_id, goal, model, status, created_at FROM sessions WHERE id = $1 FOR UPDATE"
        } else {
            "SELECT id, user_id, goal, model, status, created_at FROM sessions WHERE id = $1"
        };

        let row = sqlx::query(sql)
            .bind(session_id.as_uuid())
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("fetch session", e))?
            .ok_or(StoreError::NotFound(*session_id))?;

        let messages = sqlx::query(
            r#"
            SELECT id, session_id, role, content, created_at
            FROM messages
            WHERE session_id = $1
            ORDER BY seq
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("fetch messages", e))?
        .into_iter()
        .map(row_to_message)
        .collect::<Result<Vec<_>, _>>()?;

        let insights = sqlx::query(
            r#"
            SELECT id, session_id, content, created_at
            FROM insights
            WHERE session_id = $1
            ORDER BY seq
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("fetch insights", e))?
        .into_iter()
        .map(row_to_insight)
        .collect::<Result<Vec<_>, _>>()?;

        row_to_session(row, messages, insights)
    }

    /// Inserts the messages and insights of `session` past the given offsets.
    async fn insert_entries(
        tx: &mut Transaction<'_, Postgres>,
        session: &Session,
        messages_from: usize,
        insights_from: usize,
    ) -> Result<(), StoreError> {
        let session_id = session.id();

        for (seq, message) in session
            .messages()
            .iter()
            .enumerate()
            .skip(messages_from)
        {
            sqlx::query(
                r#"
                INSERT INTO messages (id, session_id, seq, role, content, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(message.id.as_uuid())
            .bind(session_id.as_uuid())
            .bind(seq as i32)
            .bind(message.role.as_str())
            .bind(&message.content)
            .bind(message.created_at.as_datetime())
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("insert message", e))?;
        }

        for (seq, insight) in session
            .insights()
            .iter()
            .enumerate()
            .skip(insights_from)
        {
            sqlx::query(
                r#"
                INSERT INTO insights (id, session_id, seq, content, created_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(insight.id.as_uuid())
            .bind(session_id.as_uuid())
            .bind(seq as i32)
            .bind(&insight.content)
            .bind(insight.created_at.as_datetime())
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("insert insight", e))?;
        }

        Ok(())
    }

    /// Locks `session_id`, lets `apply` mutate the aggregate, then persists the diff.
    async fn write<F>(&self, session_id: &SessionId, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Session) -> Result<(), StoreError> + Send,
    {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("start transaction", e))?;

        let mut session = Self::fetch_session(&mut tx, session_id, true).await?;
        let before = session.clone();
        apply(&mut session)?;

        Self::insert_entries(
            &mut tx,
            &session,
            before.messages().len(),
            before.insights().len(),
        )
        .await?;

        if session.status() != before.status() {
            sqlx::query("UPDATE sessions SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(session_id.as_uuid())
                .bind(session.status().as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("update status", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit transaction", e))
    }
}

#[async_trait]
impl TranscriptStore for PostgresTranscriptStore {
    async fn create_session(&self, session: &Session) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("start transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, goal, model, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.user_id().map(|u| u.as_str()))
        .bind(session.goal())
        .bind(session.model())
        .bind(session.status().as_str())
        .bind(session.created_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert session", e))?;

        Self::insert_entries(&mut tx, session, 0, 0).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit transaction", e))
    }

    async fn append_message(&self, message: &Message) -> Result<(), StoreError> {
        self.write(&message.session_id, |session| {
            session.append_message(message.clone()).map_err(Into::into)
        })
        .await
    }

    async fn append_insight(&self, insight: &Insight) -> Result<(), StoreError> {
        self.write(&insight.session_id, |session| {
            session.append_insight(insight.clone()).map_err(Into::into)
        })
        .await
    }

    async fn update_status(
        &self,
        session_id: &SessionId,
        status: SessionStatus,
    ) -> Result<(), StoreError> {
        self.write(session_id, |session| {
            session.transition_to(status).map_err(Into::into)
        })
        .await
    }

    async fn commit_round(&self, commit: &RoundCommit) -> Result<(), StoreError> {
        self.write(&commit.session_id, |session| {
            session.apply_commit(commit).map_err(Into::into)
        })
        .await
    }

    async fn load_session(&self, session_id: &SessionId) -> Result<Session, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("start transaction", e))?;
        let session = Self::fetch_session(&mut tx, session_id, false).await?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit transaction", e))?;
        Ok(session)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

/// Integrity violations are permanent; everything else may clear up on retry.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().is_some_and(|c| c.starts_with("23")) => {
            StoreError::Constraint(format!("{}: {}", operation, db.message()))
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) => {
            StoreError::Constraint(format!("{}: {}", operation, err))
        }
        _ => StoreError::unavailable(format!("Failed to {}: {}", operation, err)),
    }
}

fn corrupt(field: &str, detail: impl std::fmt::Display) -> StoreError {
    StoreError::Constraint(format!("invalid stored {}: {}", field, detail))
}

fn row_to_session(
    row: PgRow,
    messages: Vec<Message>,
    insights: Vec<Insight>,
) -> Result<Session, StoreError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| corrupt("id", e))?;
    let user_id: Option<String> = row.try_get("user_id").map_err(|e| corrupt("user_id", e))?;
    let goal: String = row.try_get("goal").map_err(|e| corrupt("goal", e))?;
    let model: String = row.try_get("model").map_err(|e| corrupt("model", e))?;
    let status: String = row.try_get("status").map_err(|e| corrupt("status", e))?;
    let created_at: chrono::DateTime<chrono::Utc> =
        row.try_get("created_at").map_err(|e| corrupt("created_at", e))?;

    let user_id = user_id
        .map(UserId::new)
        .transpose()
        .map_err(|e| corrupt("user_id", e))?;
    let status: SessionStatus = status.parse().map_err(|e| corrupt("status", e))?;

    Ok(Session::reconstitute(
        SessionId::from_uuid(id),
        user_id,
        goal,
        model,
        status,
        Timestamp::from_datetime(created_at),
        messages,
        insights,
    ))
}

fn row_to_message(row: PgRow) -> Result<Message, StoreError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| corrupt("message id", e))?;
    let session_id: uuid::Uuid = row
        .try_get("session_id")
        .map_err(|e| corrupt("message session_id", e))?;
    let role: String = row.try_get("role").map_err(|e| corrupt("role", e))?;
    let content: String = row.try_get("content").map_err(|e| corrupt("content", e))?;
    let created_at: chrono::DateTime<chrono::Utc> = row
        .try_get("created_at")
        .map_err(|e| corrupt("message created_at", e))?;

    let role: MessageRole = role.parse().map_err(|e| corrupt("role", e))?;

    Ok(Message {
        id: MessageId::from_uuid(id),
        session_id: SessionId::from_uuid(session_id),
        role,
        content,
        created_at: Timestamp::from_datetime(created_at),
    })
}

fn row_to_insight(row: PgRow) -> Result<Insight, StoreError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| corrupt("insight id", e))?;
    let session_id: uuid::Uuid = row
        .try_get("session_id")
        .map_err(|e| corrupt("insight session_id", e))?;
    let content: String = row.try_get("content").map_err(|e| corrupt("insight", e))?;
    let created_at: chrono::DateTime<chrono::Utc> = row
        .try_get("created_at")
        .map_err(|e| corrupt("insight created_at", e))?;

    Ok(Insight {
        id: InsightId::from_uuid(id),
        session_id: SessionId::from_uuid(session_id),
        content,
        created_at: Timestamp::from_datetime(created_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_errors_are_transient() {
        let err = map_sqlx_error("fetch session", sqlx::Error::PoolTimedOut);
        assert!(err.is_transient());
    }

    #[test]
    fn row_not_found_is_transient_not_constraint() {
        let err = map_sqlx_error("fetch session", sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn corrupt_rows_are_constraint_errors() {
        let err = corrupt("status", "paused");
        assert_eq!(
            err,
            StoreError::Constraint("invalid stored status: paused".to_string())
        );
    }
}
