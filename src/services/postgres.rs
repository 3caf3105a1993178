use crate::config::DatabaseSettings;
use crate::core::conversation::{conversation_id, ordered_participants};
use crate::models::{CompatibilityReport, Conversation, Message, Participant, QuizProgress, UserData};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// A report kept in a viewer's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredReport {
    pub id: Uuid,
    #[serde(flatten)]
    pub report: CompatibilityReport,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// PostgreSQL client for chat, report history and saved quiz progress
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    pub async fn new(settings: &DatabaseSettings) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections.unwrap_or(10))
            .min_connections(settings.min_connections.unwrap_or(1))
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs.unwrap_or(5)))
            .idle_timeout(Duration::from_secs(settings.idle_timeout_secs.unwrap_or(600)))
            .test_before_acquire(true)
            .connect(&settings.url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool; migrations are the caller's concern
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---- chat ----

    /// Append a message, creating the conversation on first contact
    ///
    /// Runs in one transaction: the conversation row is locked (or created),
    /// the message inserted and `last_message` / `last_update` moved forward.
    /// `compatibility_score` is only used when the conversation is created.
    pub async fn send_message(
        &self,
        sender: &UserData,
        recipient: &UserData,
        text: &str,
        compatibility_score: u8,
    ) -> Result<(Conversation, Message), PostgresError> {
        if sender.uid == recipient.uid {
            return Err(PostgresError::InvalidInput("cannot message yourself".into()));
        }

        let id = conversation_id(&sender.uid, &recipient.uid);
        let (participant1, participant2) = ordered_participants(sender, recipient);
        let message = Message {
            sender_code: sender.code.clone(),
            sender_uid: sender.uid.clone(),
            text: text.to_string(),
            timestamp: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id FROM conversations WHERE id = $1 FOR UPDATE")
            .bind(&id)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_none() {
            // Two first messages may race; the loser falls through to the update
            sqlx::query(
                r#"
                INSERT INTO conversations
                    (id, participant1_uid, participant2_uid, participant1, participant2,
                     compatibility_score, last_update)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(&id)
            .bind(&participant1.uid)
            .bind(&participant2.uid)
            .bind(Json(&participant1))
            .bind(Json(&participant2))
            .bind(i16::from(compatibility_score))
            .bind(message.timestamp)
            .execute(&mut *tx)
            .await?;
            tracing::info!("Created conversation {}", id);
        }

        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, sender_uid, sender_code, text, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&id)
        .bind(&message.sender_uid)
        .bind(&message.sender_code)
        .bind(&message.text)
        .bind(message.timestamp)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(
            r#"
            UPDATE conversations
            SET last_message = $2, last_update = $3
            WHERE id = $1
            RETURNING id, participant1_uid, participant2_uid, participant1, participant2,
                      compatibility_score, last_message, last_update
            "#,
        )
        .bind(&id)
        .bind(Json(&message))
        .bind(message.timestamp)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!("Message from {} stored in {}", sender.uid, id);
        Ok((conversation_from_row(&row)?, message))
    }

    /// Conversations of `uid`, most recently active first
    pub async fn list_conversations(&self, uid: &str) -> Result<Vec<Conversation>, PostgresError> {
        let rows = sqlx::query(
            r#"
            SELECT id, participant1_uid, participant2_uid, participant1, participant2,
                   compatibility_score, last_message, last_update
            FROM conversations
            WHERE participant1_uid = $1 OR participant2_uid = $1
            ORDER BY last_update DESC
            "#,
        )
        .bind(uid)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(conversation_from_row).collect()
    }

    pub async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, PostgresError> {
        let row = sqlx::query(
            r#"
            SELECT id, participant1_uid, participant2_uid, participant1, participant2,
                   compatibility_score, last_message, last_update
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(conversation_from_row).transpose()
    }

    /// Messages of a conversation, oldest first
    pub async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>, PostgresError> {
        let rows = sqlx::query(
            r#"
            SELECT sender_uid, sender_code, text, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Message, PostgresError> {
                Ok(Message {
                    sender_uid: row.try_get("sender_uid")?,
                    sender_code: row.try_get("sender_code")?,
                    text: row.try_get("text")?,
                    timestamp: row.try_get("created_at")?,
                })
            })
            .collect()
    }

    // ---- report history ----

    pub async fn add_report(
        &self,
        owner_uid: &str,
        report: &CompatibilityReport,
    ) -> Result<StoredReport, PostgresError> {
        let stored = StoredReport {
            id: Uuid::new_v4(),
            report: report.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO compatibility_reports (id, owner_uid, report, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(stored.id)
        .bind(owner_uid)
        .bind(Json(&stored.report))
        .bind(stored.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            "Stored report {} vs {} for {}",
            report.user1_code,
            report.user2_code,
            owner_uid
        );
        Ok(stored)
    }

    /// Report history, newest first
    pub async fn list_reports(&self, owner_uid: &str, limit: i64) -> Result<Vec<StoredReport>, PostgresError> {
        let rows = sqlx::query(
            r#"
            SELECT id, report, created_at
            FROM compatibility_reports
            WHERE owner_uid = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(owner_uid)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<StoredReport, PostgresError> {
                let Json(report): Json<CompatibilityReport> = row.try_get("report")?;
                Ok(StoredReport {
                    id: row.try_get("id")?,
                    report,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }

    pub async fn clear_reports(&self, owner_uid: &str) -> Result<u64, PostgresError> {
        let result = sqlx::query("DELETE FROM compatibility_reports WHERE owner_uid = $1")
            .bind(owner_uid)
            .execute(&self.pool)
            .await?;

        tracing::info!("Cleared {} reports for {}", result.rows_affected(), owner_uid);
        Ok(result.rows_affected())
    }

    // ---- quiz progress ----

    pub async fn get_progress(&self, uid: &str) -> Result<Option<QuizProgress>, PostgresError> {
        let row = sqlx::query("SELECT progress FROM quiz_progress WHERE uid = $1")
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let Json(progress): Json<QuizProgress> = row.try_get("progress")?;
                Ok(Some(progress))
            }
            None => Ok(None),
        }
    }

    pub async fn save_progress(&self, uid: &str, progress: &QuizProgress) -> Result<(), PostgresError> {
        sqlx::query(
            r#"
            INSERT INTO quiz_progress (uid, progress, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (uid)
            DO UPDATE SET progress = EXCLUDED.progress, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(uid)
        .bind(Json(progress))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_progress(&self, uid: &str) -> Result<bool, PostgresError> {
        let result = sqlx::query("DELETE FROM quiz_progress WHERE uid = $1")
            .bind(uid)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn conversation_from_row(row: &PgRow) -> Result<Conversation, PostgresError> {
    let Json(participant1): Json<Participant> = row.try_get("participant1")?;
    let Json(participant2): Json<Participant> = row.try_get("participant2")?;
    let last_message: Option<Json<Message>> = row.try_get("last_message")?;
    let score: i16 = row.try_get("compatibility_score")?;

    Ok(Conversation {
        id: row.try_get("id")?,
        participant_uids: vec![row.try_get("participant1_uid")?, row.try_get("participant2_uid")?],
        participant1,
        participant2,
        compatibility_score: u8::try_from(score)
            .map_err(|_| PostgresError::InvalidInput(format!("stored score {} out of range", score)))?,
        last_message: last_message.map(|Json(m)| m),
        last_update: row.try_get("last_update")?,
    })
}
