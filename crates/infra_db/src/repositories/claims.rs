//! Claims repository
//!
//! PostgreSQL adapter for `ClaimStore`. Diagnoses and item lines are
//! written once at insert; `save` writes back the workflow-mutated columns
//! and appends to the status history inside one transaction.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{
    ClaimId, ClaimItemId, Currency, DomainPort, InsurerId, Money, PatientId, PortError,
    ProviderId,
};
use domain_claims::{Claim, ClaimItem, ClaimStatus, ClaimStore, ClaimType, Diagnosis, DiagnosisKind};

use crate::error::{classify, DatabaseError};

/// Repository for claims and their status history
#[derive(Debug, Clone)]
pub struct ClaimsRepository {
    pool: PgPool,
}

impl ClaimsRepository {
    /// Creates a new repository over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, claim_id: Uuid) -> Result<Claim, DatabaseError> {
        let row: ClaimRow = sqlx::query_as(
            r#"
            SELECT claim_id, claim_number, patient_id, provider_id, insurer_id,
                   claim_type, status, service_date, currency, submitted_at,
                   last_response, disposition_note, created_at, updated_at
            FROM claims
            WHERE claim_id = $1
            "#,
        )
        .bind(claim_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?
        .ok_or_else(|| DatabaseError::not_found("Claim", claim_id))?;

        let diagnoses: Vec<DiagnosisRow> = sqlx::query_as(
            r#"
            SELECT code, kind
            FROM claim_diagnoses
            WHERE claim_id = $1
            ORDER BY sequence
            "#,
        )
        .bind(claim_id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        let items: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT item_id, service_code, description, quantity, unit_price
            FROM claim_items
            WHERE claim_id = $1
            ORDER BY sequence
            "#,
        )
        .bind(claim_id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        assemble(row, diagnoses, items)
    }

    async fn insert_claim(&self, claim: &Claim) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(classify)?;

        sqlx::query(
            r#"
            INSERT INTO claims (
                claim_id, claim_number, patient_id, provider_id, insurer_id,
                claim_type, status, service_date, currency, submitted_at,
                last_response, disposition_note, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(claim.id.into_uuid())
        .bind(&claim.claim_number)
        .bind(claim.patient_id.into_uuid())
        .bind(claim.provider_id.into_uuid())
        .bind(claim.insurer_id.into_uuid())
        .bind(claim.claim_type.code())
        .bind(claim.status.code())
        .bind(claim.service_date)
        .bind(claim.currency.code())
        .bind(claim.submitted_at)
        .bind(&claim.last_response)
        .bind(&claim.disposition_note)
        .bind(claim.created_at)
        .bind(claim.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;

        for (i, diagnosis) in claim.diagnoses.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO claim_diagnoses (claim_id, sequence, code, kind)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(claim.id.into_uuid())
            .bind(i as i32 + 1)
            .bind(&diagnosis.code)
            .bind(diagnosis.kind.code())
            .execute(&mut *tx)
            .await
            .map_err(classify)?;
        }

        for (i, item) in claim.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO claim_items (
                    item_id, claim_id, sequence, service_code, description,
                    quantity, unit_price
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(item.id.into_uuid())
            .bind(claim.id.into_uuid())
            .bind(i as i32 + 1)
            .bind(&item.service_code)
            .bind(&item.description)
            .bind(item.quantity as i32)
            .bind(item.unit_price.amount())
            .execute(&mut *tx)
            .await
            .map_err(classify)?;
        }

        sqlx::query(
            r#"
            INSERT INTO claim_status_history (history_id, claim_id, status, note, changed_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(claim.id.into_uuid())
        .bind(claim.status.code())
        .bind(Option::<String>::None)
        .bind(claim.created_at)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;

        tx.commit().await.map_err(classify)?;
        Ok(())
    }

    async fn save_claim(&self, claim: &Claim) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(classify)?;

        let current: Option<(String,)> =
            sqlx::query_as("SELECT status FROM claims WHERE claim_id = $1 FOR UPDATE")
                .bind(claim.id.into_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(classify)?;

        let current =
            current.ok_or_else(|| DatabaseError::not_found("Claim", claim.id))?;

        if current.0 != claim.status.code() {
            sqlx::query(
                r#"
                INSERT INTO claim_status_history (history_id, claim_id, status, note, changed_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(claim.id.into_uuid())
            .bind(claim.status.code())
            .bind(&claim.disposition_note)
            .bind(claim.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(classify)?;
        }

        sqlx::query(
            r#"
            UPDATE claims
            SET status = $2,
                submitted_at = $3,
                last_response = $4,
                disposition_note = $5,
                updated_at = $6
            WHERE claim_id = $1
            "#,
        )
        .bind(claim.id.into_uuid())
        .bind(claim.status.code())
        .bind(claim.submitted_at)
        .bind(&claim.last_response)
        .bind(&claim.disposition_note)
        .bind(claim.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;

        tx.commit().await.map_err(classify)?;
        Ok(())
    }
}

impl DomainPort for ClaimsRepository {}

#[async_trait]
impl ClaimStore for ClaimsRepository {
    async fn get(&self, id: ClaimId) -> Result<Claim, PortError> {
        Ok(self.fetch(id.into_uuid()).await?)
    }

    async fn insert(&self, claim: &Claim) -> Result<(), PortError> {
        Ok(self.insert_claim(claim).await?)
    }

    async fn save(&self, claim: &Claim) -> Result<(), PortError> {
        Ok(self.save_claim(claim).await?)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ClaimRow {
    claim_id: Uuid,
    claim_number: String,
    patient_id: Uuid,
    provider_id: Uuid,
    insurer_id: Uuid,
    claim_type: String,
    status: String,
    service_date: NaiveDate,
    currency: String,
    submitted_at: Option<DateTime<Utc>>,
    last_response: Option<serde_json::Value>,
    disposition_note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct DiagnosisRow {
    code: String,
    kind: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    item_id: Uuid,
    service_code: String,
    description: Option<String>,
    quantity: i32,
    unit_price: Decimal,
}

fn assemble(
    row: ClaimRow,
    diagnoses: Vec<DiagnosisRow>,
    items: Vec<ItemRow>,
) -> Result<Claim, DatabaseError> {
    let claim_type = ClaimType::from_code(&row.claim_type)
        .ok_or_else(|| DatabaseError::corrupt_row("claims", "claim_type", &row.claim_type))?;
    let status = ClaimStatus::from_code(&row.status)
        .ok_or_else(|| DatabaseError::corrupt_row("claims", "status", &row.status))?;
    let currency = Currency::from_code(&row.currency)
        .map_err(|_| DatabaseError::corrupt_row("claims", "currency", &row.currency))?;

    let diagnoses = diagnoses
        .into_iter()
        .map(|d| {
            DiagnosisKind::from_code(&d.kind)
                .map(|kind| Diagnosis { code: d.code.clone(), kind })
                .ok_or_else(|| DatabaseError::corrupt_row("claim_diagnoses", "kind", &d.kind))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let items = items
        .into_iter()
        .map(|item| ClaimItem {
            id: ClaimItemId::from(item.item_id),
            service_code: item.service_code,
            description: item.description,
            quantity: item.quantity.max(0) as u32,
            unit_price: Money::new(item.unit_price, currency),
        })
        .collect();

    Ok(Claim {
        id: ClaimId::from(row.claim_id),
        claim_number: row.claim_number,
        patient_id: PatientId::from(row.patient_id),
        provider_id: ProviderId::from(row.provider_id),
        insurer_id: InsurerId::from(row.insurer_id),
        claim_type,
        status,
        service_date: row.service_date,
        currency,
        diagnoses,
        items,
        submitted_at: row.submitted_at,
        last_response: row.last_response,
        disposition_note: row.disposition_note,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
