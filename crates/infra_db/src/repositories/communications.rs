//! Communications repository
//!
//! PostgreSQL adapter for `CommunicationStore`. Listing orders by creation
//! time so the relay's creation-order guarantee holds.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{ClaimId, CommunicationId, DomainPort, PortError};
use domain_exchange::{AckStatus, Communication, CommunicationPayload, CommunicationStore, Direction};

use crate::error::{classify, DatabaseError};

/// Repository for communications and their payloads
#[derive(Debug, Clone)]
pub struct CommunicationsRepository {
    pool: PgPool,
}

impl CommunicationsRepository {
    /// Creates a new repository over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_row(&self, communication: &Communication) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(classify)?;

        sqlx::query(
            r#"
            INSERT INTO communications (
                communication_id, claim_id, direction, ack_status, reference, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(communication.id.into_uuid())
        .bind(communication.claim_id.into_uuid())
        .bind(communication.direction.code())
        .bind(communication.ack_status.code())
        .bind(&communication.reference)
        .bind(communication.created_at)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;

        for (i, payload) in communication.payloads.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO communication_payloads (
                    communication_id, sequence, content, attachment_url, attachment_title
                ) VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(communication.id.into_uuid())
            .bind(i as i32 + 1)
            .bind(&payload.content)
            .bind(&payload.attachment_url)
            .bind(&payload.attachment_title)
            .execute(&mut *tx)
            .await
            .map_err(classify)?;
        }

        tx.commit().await.map_err(classify)?;
        Ok(())
    }

    async fn save_row(&self, communication: &Communication) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE communications
            SET ack_status = $2, reference = $3
            WHERE communication_id = $1
            "#,
        )
        .bind(communication.id.into_uuid())
        .bind(communication.ack_status.code())
        .bind(&communication.reference)
        .execute(&self.pool)
        .await
        .map_err(classify)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Communication", communication.id));
        }
        Ok(())
    }

    async fn list_rows(&self, claim_id: Uuid) -> Result<Vec<Communication>, DatabaseError> {
        let rows: Vec<CommunicationRow> = sqlx::query_as(
            r#"
            SELECT communication_id, claim_id, direction, ack_status, reference, created_at
            FROM communications
            WHERE claim_id = $1
            ORDER BY created_at, communication_id
            "#,
        )
        .bind(claim_id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.communication_id).collect();
        let payloads: Vec<PayloadRow> = sqlx::query_as(
            r#"
            SELECT communication_id, content, attachment_url, attachment_title
            FROM communication_payloads
            WHERE communication_id = ANY($1)
            ORDER BY communication_id, sequence
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        rows.into_iter()
            .map(|row| {
                let own_payloads = payloads
                    .iter()
                    .filter(|p| p.communication_id == row.communication_id)
                    .map(|p| CommunicationPayload {
                        content: p.content.clone(),
                        attachment_url: p.attachment_url.clone(),
                        attachment_title: p.attachment_title.clone(),
                    })
                    .collect();
                assemble(row, own_payloads)
            })
            .collect()
    }
}

impl DomainPort for CommunicationsRepository {}

#[async_trait]
impl CommunicationStore for CommunicationsRepository {
    async fn insert(&self, communication: &Communication) -> Result<(), PortError> {
        Ok(self.insert_row(communication).await?)
    }

    async fn save(&self, communication: &Communication) -> Result<(), PortError> {
        Ok(self.save_row(communication).await?)
    }

    async fn list_for_claim(&self, claim_id: ClaimId) -> Result<Vec<Communication>, PortError> {
        Ok(self.list_rows(claim_id.into_uuid()).await?)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CommunicationRow {
    communication_id: Uuid,
    claim_id: Uuid,
    direction: String,
    ack_status: String,
    reference: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct PayloadRow {
    communication_id: Uuid,
    content: Option<String>,
    attachment_url: Option<String>,
    attachment_title: Option<String>,
}

fn assemble(
    row: CommunicationRow,
    payloads: Vec<CommunicationPayload>,
) -> Result<Communication, DatabaseError> {
    let direction = Direction::from_code(&row.direction).ok_or_else(|| {
        DatabaseError::corrupt_row("communications", "direction", &row.direction)
    })?;
    let ack_status = AckStatus::from_code(&row.ack_status).ok_or_else(|| {
        DatabaseError::corrupt_row("communications", "ack_status", &row.ack_status)
    })?;

    Ok(Communication {
        id: CommunicationId::from(row.communication_id),
        claim_id: ClaimId::from(row.claim_id),
        direction,
        payloads,
        ack_status,
        reference: row.reference,
        created_at: row.created_at,
    })
}
