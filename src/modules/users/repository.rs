use atrium_authz::{hash_password, verify_password, Role};
use atrium_db::{Collection, Database};
use atrium_http::{AppError, AppResult};

use super::models::{User, UserRecord};
use crate::utils::new_id;

pub const TABLE: &str = "user";

/// Credential store
#[derive(Clone)]
pub struct UserRepository {
    users: Collection,
}

impl UserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            users: db.collection(TABLE),
        }
    }

    /// Create an identity with a freshly hashed password.
    pub async fn create(&self, username: &str, password: &str, role: Role) -> AppResult<User> {
        if self.find_by_username(username).await?.is_some() {
            return Err(AppError::conflict(
                vec![serde_json::json!({ "field": "username" })],
                "username already exists",
            ));
        }

        let password = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(AppError::internal)?
            .map_err(AppError::internal)?;

        let record = UserRecord {
            id: new_id(),
            username: username.to_owned(),
            password_hash,
            role,
        };
        self.users.insert(&record.id, &record).await?;

        tracing::info!(user_id = %record.id, role = %record.role, "user registered");
        Ok(record.into())
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .find_one_by("username", username.to_owned())
            .await?)
    }

    /// The identity if `username` exists and `password` matches it
    pub async fn check_credentials(&self, username: &str, password: &str) -> AppResult<Option<User>> {
        let Some(record) = self.find_by_username(username).await? else {
            return Ok(None);
        };

        let password = password.to_owned();
        let hash = record.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(AppError::internal)?;

        Ok(matches.then(|| record.into()))
    }

    pub async fn get(&self, id: &str) -> AppResult<Option<User>> {
        let record: Option<UserRecord> = self.users.get(id).await?;
        Ok(record.map(User::from))
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        let records: Vec<UserRecord> = self.users.list().await?;
        Ok(records.into_iter().map(User::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing;

    async fn repository() -> UserRepository {
        UserRepository::new(&testing::database().await)
    }

    #[tokio::test]
    async fn duplicate_username_is_conflict() {
        let users = repository().await;
        users.create("alice", "pw", Role::User).await.unwrap();

        let err = users.create("alice", "other", Role::Admin).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn credentials_are_checked_against_the_hash() {
        let users = repository().await;
        let alice = users.create("alice", "s3cret", Role::User).await.unwrap();

        let found = users.check_credentials("alice", "s3cret").await.unwrap();
        assert_eq!(found, Some(alice.clone()));
        assert_eq!(users.check_credentials("alice", "wrong").await.unwrap(), None);
        assert_eq!(users.check_credentials("nobody", "s3cret").await.unwrap(), None);

        let record = users.find_by_username("alice").await.unwrap().unwrap();
        assert_ne!(record.password_hash, "s3cret");
        assert_eq!(users.get(&alice.id).await.unwrap(), Some(alice));
    }

    #[tokio::test]
    async fn list_returns_public_views() {
        let users = repository().await;
        users.create("alice", "pw", Role::User).await.unwrap();
        users.create("root", "pw", Role::Admin).await.unwrap();

        let mut names: Vec<String> = users
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        names.sort();
        assert_eq!(names, vec!["alice", "root"]);
    }
}
