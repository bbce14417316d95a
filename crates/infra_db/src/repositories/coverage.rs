//! Coverage repository
//!
//! PostgreSQL adapter for `CoverageStore`: eligibility check results and
//! prior authorizations.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{
    Currency, DomainPort, EligibilityId, InsurerId, Money, PatientId, PortError, PriorAuthId,
    ProviderId,
};
use domain_coverage::{
    AuthStatus, CoverageStore, EligibilityCheck, EligibilityOutcome, EligibilityPurpose,
    PriorAuthorization,
};

use crate::error::{classify, DatabaseError};

/// Repository for eligibility checks and prior authorizations
#[derive(Debug, Clone)]
pub struct CoverageRepository {
    pool: PgPool,
}

impl CoverageRepository {
    /// Creates a new repository over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_eligibility(&self, id: Uuid) -> Result<EligibilityCheck, DatabaseError> {
        let row: EligibilityRow = sqlx::query_as(
            r#"
            SELECT eligibility_id, patient_id, provider_id, insurer_id, service_date,
                   purpose, eligible, site_eligibility, benefit_notes, checked_at, created_at
            FROM eligibility_checks
            WHERE eligibility_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?
        .ok_or_else(|| DatabaseError::not_found("EligibilityCheck", id))?;

        row.try_into()
    }

    async fn fetch_prior_auth(&self, id: Uuid) -> Result<PriorAuthorization, DatabaseError> {
        let row: PriorAuthRow = sqlx::query_as(
            r#"
            SELECT prior_auth_id, patient_id, provider_id, insurer_id, service_code,
                   description, requested_amount, currency, status, auth_number,
                   approved_amount, expiry_date, denial_reason, submitted_at,
                   last_response, created_at, updated_at
            FROM prior_authorizations
            WHERE prior_auth_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?
        .ok_or_else(|| DatabaseError::not_found("PriorAuthorization", id))?;

        row.try_into()
    }
}

impl DomainPort for CoverageRepository {}

#[async_trait]
impl CoverageStore for CoverageRepository {
    async fn insert_eligibility(&self, check: &EligibilityCheck) -> Result<(), PortError> {
        let (eligible, site_eligibility, benefit_notes) = match &check.outcome {
            Some(outcome) => (
                Some(outcome.eligible),
                outcome.site_eligibility.clone(),
                serde_json::to_value(&outcome.benefit_notes)
                    .unwrap_or(serde_json::Value::Array(vec![])),
            ),
            None => (None, None, serde_json::Value::Array(vec![])),
        };

        sqlx::query(
            r#"
            INSERT INTO eligibility_checks (
                eligibility_id, patient_id, provider_id, insurer_id, service_date,
                purpose, eligible, site_eligibility, benefit_notes, checked_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(check.id.into_uuid())
        .bind(check.patient_id.into_uuid())
        .bind(check.provider_id.into_uuid())
        .bind(check.insurer_id.into_uuid())
        .bind(check.service_date)
        .bind(check.purpose.code())
        .bind(eligible)
        .bind(site_eligibility)
        .bind(benefit_notes)
        .bind(check.checked_at)
        .bind(check.created_at)
        .execute(&self.pool)
        .await
        .map_err(classify)
        .map_err(PortError::from)?;
        Ok(())
    }

    async fn get_eligibility(&self, id: EligibilityId) -> Result<EligibilityCheck, PortError> {
        Ok(self.fetch_eligibility(id.into_uuid()).await?)
    }

    async fn insert_prior_auth(&self, auth: &PriorAuthorization) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO prior_authorizations (
                prior_auth_id, patient_id, provider_id, insurer_id, service_code,
                description, requested_amount, currency, status, auth_number,
                approved_amount, expiry_date, denial_reason, submitted_at,
                last_response, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(auth.id.into_uuid())
        .bind(auth.patient_id.into_uuid())
        .bind(auth.provider_id.into_uuid())
        .bind(auth.insurer_id.into_uuid())
        .bind(&auth.service_code)
        .bind(&auth.description)
        .bind(auth.requested_amount.amount())
        .bind(auth.requested_amount.currency().code())
        .bind(auth.status.code())
        .bind(&auth.auth_number)
        .bind(auth.approved_amount.map(|m| m.amount()))
        .bind(auth.expiry_date)
        .bind(&auth.denial_reason)
        .bind(auth.submitted_at)
        .bind(&auth.last_response)
        .bind(auth.created_at)
        .bind(auth.updated_at)
        .execute(&self.pool)
        .await
        .map_err(classify)
        .map_err(PortError::from)?;
        Ok(())
    }

    async fn get_prior_auth(&self, id: PriorAuthId) -> Result<PriorAuthorization, PortError> {
        Ok(self.fetch_prior_auth(id.into_uuid()).await?)
    }

    async fn save_prior_auth(&self, auth: &PriorAuthorization) -> Result<(), PortError> {
        let result = sqlx::query(
            r#"
            UPDATE prior_authorizations
            SET status = $2,
                auth_number = $3,
                approved_amount = $4,
                expiry_date = $5,
                denial_reason = $6,
                submitted_at = $7,
                last_response = $8,
                updated_at = $9
            WHERE prior_auth_id = $1
            "#,
        )
        .bind(auth.id.into_uuid())
        .bind(auth.status.code())
        .bind(&auth.auth_number)
        .bind(auth.approved_amount.map(|m| m.amount()))
        .bind(auth.expiry_date)
        .bind(&auth.denial_reason)
        .bind(auth.submitted_at)
        .bind(&auth.last_response)
        .bind(auth.updated_at)
        .execute(&self.pool)
        .await
        .map_err(classify)
        .map_err(PortError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("PriorAuthorization", auth.id));
        }
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EligibilityRow {
    eligibility_id: Uuid,
    patient_id: Uuid,
    provider_id: Uuid,
    insurer_id: Uuid,
    service_date: NaiveDate,
    purpose: String,
    eligible: Option<bool>,
    site_eligibility: Option<String>,
    benefit_notes: serde_json::Value,
    checked_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<EligibilityRow> for EligibilityCheck {
    type Error = DatabaseError;

    fn try_from(row: EligibilityRow) -> Result<Self, Self::Error> {
        let purpose = EligibilityPurpose::from_code(&row.purpose).ok_or_else(|| {
            DatabaseError::corrupt_row("eligibility_checks", "purpose", &row.purpose)
        })?;

        let outcome = row.eligible.map(|eligible| EligibilityOutcome {
            eligible,
            site_eligibility: row.site_eligibility.clone(),
            benefit_notes: serde_json::from_value(row.benefit_notes.clone())
                .unwrap_or_default(),
        });

        Ok(EligibilityCheck {
            id: EligibilityId::from(row.eligibility_id),
            patient_id: PatientId::from(row.patient_id),
            provider_id: ProviderId::from(row.provider_id),
            insurer_id: InsurerId::from(row.insurer_id),
            service_date: row.service_date,
            purpose,
            outcome,
            checked_at: row.checked_at,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PriorAuthRow {
    prior_auth_id: Uuid,
    patient_id: Uuid,
    provider_id: Uuid,
    insurer_id: Uuid,
    service_code: String,
    description: Option<String>,
    requested_amount: Decimal,
    currency: String,
    status: String,
    auth_number: Option<String>,
    approved_amount: Option<Decimal>,
    expiry_date: Option<NaiveDate>,
    denial_reason: Option<String>,
    submitted_at: Option<DateTime<Utc>>,
    last_response: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PriorAuthRow> for PriorAuthorization {
    type Error = DatabaseError;

    fn try_from(row: PriorAuthRow) -> Result<Self, Self::Error> {
        let status = AuthStatus::from_code(&row.status).ok_or_else(|| {
            DatabaseError::corrupt_row("prior_authorizations", "status", &row.status)
        })?;
        let currency = Currency::from_code(&row.currency).map_err(|_| {
            DatabaseError::corrupt_row("prior_authorizations", "currency", &row.currency)
        })?;

        Ok(PriorAuthorization {
            id: PriorAuthId::from(row.prior_auth_id),
            patient_id: PatientId::from(row.patient_id),
            provider_id: ProviderId::from(row.provider_id),
            insurer_id: InsurerId::from(row.insurer_id),
            service_code: row.service_code,
            description: row.description,
            requested_amount: Money::new(row.requested_amount, currency),
            status,
            auth_number: row.auth_number,
            approved_amount: row.approved_amount.map(|d| Money::new(d, currency)),
            expiry_date: row.expiry_date,
            denial_reason: row.denial_reason,
            submitted_at: row.submitted_at,
            last_response: row.last_response,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
