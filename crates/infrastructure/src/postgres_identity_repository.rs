//! PostgreSQL-backed identity repository over `staff_users` and `clients`.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use visaflow_application::{
    ClientCredentials, CredentialRepository, IdentityRepository, StaffCredentials,
};
use visaflow_core::{AppError, AppResult};
use visaflow_domain::{Client, ClientId, ClientStatus, EmailAddress, StaffRole, StaffUser, UserId};

/// PostgreSQL implementation of the identity and credential ports.
#[derive(Clone)]
pub struct PostgresIdentityRepository {
    pool: PgPool,
}

impl PostgresIdentityRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StaffUserRow {
    id: Uuid,
    email: String,
    name: String,
    role: String,
    is_active: bool,
}

impl TryFrom<StaffUserRow> for StaffUser {
    type Error = AppError;

    fn try_from(row: StaffUserRow) -> Result<Self, Self::Error> {
        let role = StaffRole::from_str(row.role.as_str()).map_err(|error| {
            AppError::Internal(format!("staff user '{}' has invalid role: {error}", row.id))
        })?;

        Ok(Self {
            id: UserId::from_uuid(row.id),
            email: row.email,
            name: row.name,
            role,
            is_active: row.is_active,
        })
    }
}

/// Login lookup row. Only credential queries select the hash.
#[derive(Debug, sqlx::FromRow)]
struct StaffCredentialsRow {
    #[sqlx(flatten)]
    user: StaffUserRow,
    password_hash: Option<String>,
}

impl TryFrom<StaffCredentialsRow> for StaffCredentials {
    type Error = AppError;

    fn try_from(row: StaffCredentialsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user: StaffUser::try_from(row.user)?,
            password_hash: row.password_hash.unwrap_or_default(),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    id: Uuid,
    email: String,
    name: String,
    status: String,
}

impl TryFrom<ClientRow> for Client {
    type Error = AppError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        let status = ClientStatus::from_str(row.status.as_str()).map_err(|error| {
            AppError::Internal(format!("client '{}' has invalid status: {error}", row.id))
        })?;

        Ok(Self {
            id: ClientId::from_uuid(row.id),
            email: row.email,
            name: row.name,
            status,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ClientCredentialsRow {
    #[sqlx(flatten)]
    client: ClientRow,
    password_hash: Option<String>,
}

impl TryFrom<ClientCredentialsRow> for ClientCredentials {
    type Error = AppError;

    fn try_from(row: ClientCredentialsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            client: Client::try_from(row.client)?,
            password_hash: row.password_hash.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl IdentityRepository for PostgresIdentityRepository {
    async fn find_staff_user(&self, user_id: UserId) -> AppResult<Option<StaffUser>> {
        let row = sqlx::query_as::<_, StaffUserRow>(
            r#"
            SELECT id, email, name, role, is_active
            FROM staff_users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load staff user: {error}")))?;

        row.map(StaffUser::try_from).transpose()
    }

    async fn find_client(&self, client_id: ClientId) -> AppResult<Option<Client>> {
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, email, name, status
            FROM clients
            WHERE id = $1
            "#,
        )
        .bind(client_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load client: {error}")))?;

        row.map(Client::try_from).transpose()
    }
}

#[async_trait]
impl CredentialRepository for PostgresIdentityRepository {
    async fn find_staff_credentials(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<StaffCredentials>> {
        let row = sqlx::query_as::<_, StaffCredentialsRow>(
            r#"
            SELECT id, email, name, role, is_active, password_hash
            FROM staff_users
            WHERE lower(email) = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load staff credentials: {error}"))
        })?;

        row.map(StaffCredentials::try_from).transpose()
    }

    async fn find_client_credentials(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<ClientCredentials>> {
        let row = sqlx::query_as::<_, ClientCredentialsRow>(
            r#"
            SELECT id, email, name, status, password_hash
            FROM clients
            WHERE lower(email) = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load client credentials: {error}"))
        })?;

        row.map(ClientCredentials::try_from).transpose()
    }
}
