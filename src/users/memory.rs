use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::password::hash_password;
use super::repo::UserRepository;
use super::repo_types::{NewUser, RepoError, RepoResult, User};

/// In-memory `UserRepository` for tests and local runs without Postgres.
///
/// Mirrors the table's rules: serial ids starting at 1, case-insensitive
/// unique email, rows returned in insertion order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert_user(&self, user: NewUser) -> RepoResult<i32> {
        let password_hash = hash_password(&user.password)?;
        let mut users = self.users.write().await;

        if users
            .iter()
            .any(|u| u.email_addr.eq_ignore_ascii_case(&user.email_addr))
        {
            return Err(RepoError::UniqueViolation);
        }

        let id = users.last().map_or(1, |u| u.id + 1);
        users.push(User {
            id,
            email_addr: user.email_addr,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash,
        });
        Ok(id)
    }

    async fn list_users(&self, limit: Option<i64>) -> RepoResult<Vec<User>> {
        let users = self.users.read().await;
        let take = limit.map_or(users.len(), |n| usize::try_from(n).unwrap_or(0));
        Ok(users.iter().take(take).cloned().collect())
    }

    async fn find_id_by_email(&self, email_addr: &str) -> RepoResult<Option<i32>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.email_addr.eq_ignore_ascii_case(email_addr))
            .map(|u| u.id))
    }

    async fn find_password_hash(&self, id: i32) -> RepoResult<Option<String>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.password_hash.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email_addr: email.into(),
            first_name: "Jo".into(),
            last_name: "Doe".into(),
            password: "abcdef12".into(),
        }
    }

    #[tokio::test]
    async fn assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();
        assert_eq!(repo.insert_user(new_user("a@b.com")).await.unwrap(), 1);
        assert_eq!(repo.insert_user(new_user("c@d.com")).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn duplicate_email_ignores_case() {
        let repo = InMemoryUserRepository::new();
        repo.insert_user(new_user("A@x.com")).await.unwrap();
        let err = repo.insert_user(new_user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, RepoError::UniqueViolation));
        assert_eq!(repo.list_users(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stores_hash_not_plaintext() {
        let repo = InMemoryUserRepository::new();
        let id = repo.insert_user(new_user("a@b.com")).await.unwrap();
        let hash = repo.find_password_hash(id).await.unwrap().unwrap();
        assert_ne!(hash, "abcdef12");
        assert!(hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn list_respects_limit_and_empty_table() {
        let repo = InMemoryUserRepository::new();
        assert!(repo.list_users(None).await.unwrap().is_empty());
        for email in ["a@b.com", "c@d.com", "e@f.com"] {
            repo.insert_user(new_user(email)).await.unwrap();
        }
        let two = repo.list_users(Some(2)).await.unwrap();
        assert_eq!(two.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn find_id_by_email_missing_is_none() {
        let repo = InMemoryUserRepository::new();
        assert_eq!(repo.find_id_by_email("nobody@x.com").await.unwrap(), None);
    }
}
