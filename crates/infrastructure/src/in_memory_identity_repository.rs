//! In-memory identity repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use visaflow_application::{
    ClientCredentials, CredentialRepository, IdentityRepository, StaffCredentials,
};
use visaflow_core::{AppError, AppResult};
use visaflow_domain::{Client, ClientId, EmailAddress, StaffUser, UserId};

/// In-memory identity repository implementation.
///
/// Records can be changed after tokens were issued, which makes the
/// re-resolution of every request observable.
#[derive(Debug, Default)]
pub struct InMemoryIdentityRepository {
    staff: RwLock<HashMap<UserId, StaffCredentials>>,
    clients: RwLock<HashMap<ClientId, ClientCredentials>>,
}

impl InMemoryIdentityRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a staff user.
    pub async fn save_staff_user(&self, user: StaffUser, password_hash: impl Into<String>) -> AppResult<()> {
        let email = EmailAddress::new(user.email.as_str())?;
        let mut staff = self.staff.write().await;

        if staff
            .values()
            .any(|existing| existing.user.id != user.id && existing.user.email == email.as_str())
        {
            return Err(AppError::Conflict(format!(
                "staff user with email '{}' already exists",
                email.as_str()
            )));
        }

        let user = StaffUser {
            email: email.as_str().to_owned(),
            ..user
        };
        staff.insert(
            user.id,
            StaffCredentials {
                user,
                password_hash: password_hash.into(),
            },
        );
        Ok(())
    }

    /// Replaces the stored record of an existing staff user, keeping its password.
    pub async fn update_staff_user(&self, user: StaffUser) -> AppResult<()> {
        let mut staff = self.staff.write().await;
        let Some(credentials) = staff.get_mut(&user.id) else {
            return Err(AppError::NotFound(format!("staff user '{}' not found", user.id)));
        };

        credentials.user = user;
        Ok(())
    }

    /// Deletes a staff user.
    pub async fn remove_staff_user(&self, user_id: UserId) -> bool {
        self.staff.write().await.remove(&user_id).is_some()
    }

    /// Inserts or replaces a client.
    pub async fn save_client(&self, client: Client, password_hash: impl Into<String>) -> AppResult<()> {
        let email = EmailAddress::new(client.email.as_str())?;
        let mut clients = self.clients.write().await;

        if clients.values().any(|existing| {
            existing.client.id != client.id && existing.client.email == email.as_str()
        }) {
            return Err(AppError::Conflict(format!(
                "client with email '{}' already exists",
                email.as_str()
            )));
        }

        let client = Client {
            email: email.as_str().to_owned(),
            ..client
        };
        clients.insert(
            client.id,
            ClientCredentials {
                client,
                password_hash: password_hash.into(),
            },
        );
        Ok(())
    }

    /// Replaces the stored record of an existing client, keeping its password.
    pub async fn update_client(&self, client: Client) -> AppResult<()> {
        let mut clients = self.clients.write().await;
        let Some(credentials) = clients.get_mut(&client.id) else {
            return Err(AppError::NotFound(format!("client '{}' not found", client.id)));
        };

        credentials.client = client;
        Ok(())
    }
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn find_staff_user(&self, user_id: UserId) -> AppResult<Option<StaffUser>> {
        Ok(self
            .staff
            .read()
            .await
            .get(&user_id)
            .map(|credentials| credentials.user.clone()))
    }

    async fn find_client(&self, client_id: ClientId) -> AppResult<Option<Client>> {
        Ok(self
            .clients
            .read()
            .await
            .get(&client_id)
            .map(|credentials| credentials.client.clone()))
    }
}

#[async_trait]
impl CredentialRepository for InMemoryIdentityRepository {
    async fn find_staff_credentials(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<StaffCredentials>> {
        Ok(self
            .staff
            .read()
            .await
            .values()
            .find(|credentials| credentials.user.email == email.as_str())
            .cloned())
    }

    async fn find_client_credentials(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<ClientCredentials>> {
        Ok(self
            .clients
            .read()
            .await
            .values()
            .find(|credentials| credentials.client.email == email.as_str())
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use visaflow_application::{CredentialRepository, IdentityRepository};
    use visaflow_core::AppError;
    use visaflow_domain::{EmailAddress, StaffRole, StaffUser, UserId};

    use super::InMemoryIdentityRepository;

    fn staff(email: &str) -> StaffUser {
        StaffUser {
            id: UserId::new(),
            email: email.to_owned(),
            name: "Case Officer".to_owned(),
            role: StaffRole::Staff,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn emails_are_normalized_and_unique() {
        let repository = InMemoryIdentityRepository::new();
        assert!(repository.save_staff_user(staff(" Officer@VisaFlow.test"), "hash").await.is_ok());

        let duplicate = repository.save_staff_user(staff("officer@visaflow.test"), "hash").await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));

        let Ok(email) = EmailAddress::new("officer@visaflow.test") else {
            panic!("email should parse");
        };
        let found = repository.find_staff_credentials(&email).await;
        assert_eq!(
            found.ok().flatten().map(|credentials| credentials.password_hash),
            Some("hash".to_owned())
        );
    }

    #[tokio::test]
    async fn updates_and_removals_are_visible_to_lookups() {
        let repository = InMemoryIdentityRepository::new();
        let user = staff("admin@visaflow.test");
        let user_id = user.id;
        assert!(repository.save_staff_user(user.clone(), "hash").await.is_ok());

        let downgraded = StaffUser {
            role: StaffRole::Consultant,
            ..user
        };
        assert!(repository.update_staff_user(downgraded).await.is_ok());
        let found = repository.find_staff_user(user_id).await;
        assert_eq!(
            found.ok().flatten().map(|user| user.role),
            Some(StaffRole::Consultant)
        );

        assert!(repository.remove_staff_user(user_id).await);
        assert!(matches!(repository.find_staff_user(user_id).await, Ok(None)));
        assert!(matches!(
            repository.update_staff_user(staff("ghost@visaflow.test")).await,
            Err(AppError::NotFound(_))
        ));
    }
}
