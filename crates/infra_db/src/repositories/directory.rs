//! Directory repository
//!
//! PostgreSQL adapter for `DirectoryStore`. `put_*` operations upsert so
//! reference data can be loaded idempotently.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{DomainPort, InsurerId, PatientId, PortError, ProviderId};
use domain_directory::{DirectoryStore, Gender, Insurer, Patient, Provider, ProviderKind};

use crate::error::{classify, DatabaseError};

/// Repository for patient, provider, and insurer reference records
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    pool: PgPool,
}

impl DirectoryRepository {
    /// Creates a new repository over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_patient(&self, id: Uuid) -> Result<Patient, DatabaseError> {
        let row: PatientRow = sqlx::query_as(
            r#"
            SELECT patient_id, national_id, first_name, last_name, date_of_birth,
                   gender, phone, email, is_active, created_at, updated_at
            FROM patients
            WHERE patient_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?
        .ok_or_else(|| DatabaseError::not_found("Patient", id))?;

        row.try_into()
    }

    async fn fetch_provider(&self, id: Uuid) -> Result<Provider, DatabaseError> {
        let row: ProviderRow = sqlx::query_as(
            r#"
            SELECT provider_id, name, license_number, kind, specialty, phone,
                   is_active, created_at, updated_at
            FROM providers
            WHERE provider_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?
        .ok_or_else(|| DatabaseError::not_found("Provider", id))?;

        row.try_into()
    }

    async fn fetch_insurer(&self, id: Uuid) -> Result<Insurer, DatabaseError> {
        let row: InsurerRow = sqlx::query_as(
            r#"
            SELECT insurer_id, name, payer_license, email, phone,
                   is_active, created_at, updated_at
            FROM insurers
            WHERE insurer_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?
        .ok_or_else(|| DatabaseError::not_found("Insurer", id))?;

        Ok(row.into())
    }
}

impl DomainPort for DirectoryRepository {}

#[async_trait]
impl DirectoryStore for DirectoryRepository {
    async fn get_patient(&self, id: PatientId) -> Result<Patient, PortError> {
        Ok(self.fetch_patient(id.into_uuid()).await?)
    }

    async fn get_provider(&self, id: ProviderId) -> Result<Provider, PortError> {
        Ok(self.fetch_provider(id.into_uuid()).await?)
    }

    async fn get_insurer(&self, id: InsurerId) -> Result<Insurer, PortError> {
        Ok(self.fetch_insurer(id.into_uuid()).await?)
    }

    async fn put_patient(&self, patient: &Patient) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO patients (
                patient_id, national_id, first_name, last_name, date_of_birth,
                gender, phone, email, is_active, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (patient_id) DO UPDATE SET
                national_id = EXCLUDED.national_id,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                date_of_birth = EXCLUDED.date_of_birth,
                gender = EXCLUDED.gender,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email,
                is_active = EXCLUDED.is_active,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(patient.id.into_uuid())
        .bind(&patient.national_id)
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(patient.date_of_birth)
        .bind(patient.gender.code())
        .bind(&patient.phone)
        .bind(&patient.email)
        .bind(patient.is_active)
        .bind(patient.created_at)
        .bind(patient.updated_at)
        .execute(&self.pool)
        .await
        .map_err(classify)
        .map_err(PortError::from)?;
        Ok(())
    }

    async fn put_provider(&self, provider: &Provider) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO providers (
                provider_id, name, license_number, kind, specialty, phone,
                is_active, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (provider_id) DO UPDATE SET
                name = EXCLUDED.name,
                license_number = EXCLUDED.license_number,
                kind = EXCLUDED.kind,
                specialty = EXCLUDED.specialty,
                phone = EXCLUDED.phone,
                is_active = EXCLUDED.is_active,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(provider.id.into_uuid())
        .bind(&provider.name)
        .bind(&provider.license_number)
        .bind(provider.kind.code())
        .bind(&provider.specialty)
        .bind(&provider.phone)
        .bind(provider.is_active)
        .bind(provider.created_at)
        .bind(provider.updated_at)
        .execute(&self.pool)
        .await
        .map_err(classify)
        .map_err(PortError::from)?;
        Ok(())
    }

    async fn put_insurer(&self, insurer: &Insurer) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO insurers (
                insurer_id, name, payer_license, email, phone,
                is_active, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (insurer_id) DO UPDATE SET
                name = EXCLUDED.name,
                payer_license = EXCLUDED.payer_license,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                is_active = EXCLUDED.is_active,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(insurer.id.into_uuid())
        .bind(&insurer.name)
        .bind(&insurer.payer_license)
        .bind(&insurer.email)
        .bind(&insurer.phone)
        .bind(insurer.is_active)
        .bind(insurer.created_at)
        .bind(insurer.updated_at)
        .execute(&self.pool)
        .await
        .map_err(classify)
        .map_err(PortError::from)?;
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PatientRow {
    patient_id: Uuid,
    national_id: String,
    first_name: String,
    last_name: String,
    date_of_birth: NaiveDate,
    gender: String,
    phone: Option<String>,
    email: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PatientRow> for Patient {
    type Error = DatabaseError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let gender = Gender::from_code(&row.gender)
            .ok_or_else(|| DatabaseError::corrupt_row("patients", "gender", &row.gender))?;
        Ok(Patient {
            id: PatientId::from(row.patient_id),
            national_id: row.national_id,
            first_name: row.first_name,
            last_name: row.last_name,
            date_of_birth: row.date_of_birth,
            gender,
            phone: row.phone,
            email: row.email,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProviderRow {
    provider_id: Uuid,
    name: String,
    license_number: String,
    kind: String,
    specialty: Option<String>,
    phone: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProviderRow> for Provider {
    type Error = DatabaseError;

    fn try_from(row: ProviderRow) -> Result<Self, Self::Error> {
        let kind = ProviderKind::from_code(&row.kind)
            .ok_or_else(|| DatabaseError::corrupt_row("providers", "kind", &row.kind))?;
        Ok(Provider {
            id: ProviderId::from(row.provider_id),
            name: row.name,
            license_number: row.license_number,
            kind,
            specialty: row.specialty,
            phone: row.phone,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InsurerRow {
    insurer_id: Uuid,
    name: String,
    payer_license: String,
    email: Option<String>,
    phone: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InsurerRow> for Insurer {
    fn from(row: InsurerRow) -> Self {
        Insurer {
            id: InsurerId::from(row.insurer_id),
            name: row.name,
            payer_license: row.payer_license,
            email: row.email,
            phone: row.phone,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
