use std::{collections::BTreeMap, sync::Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;

use super::repo::{NewUser, RepoError, User, UserChanges, UserRepo};

/// In-process store with the same uniqueness rule as the `users` table.
#[derive(Default)]
pub struct MemoryUserRepo {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    last_id: i64,
    users: BTreeMap<i64, User>,
}

impl Inner {
    fn username_taken(&self, username: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.username == username && Some(u.id) != except)
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn server_time(&self) -> Result<OffsetDateTime, RepoError> {
        Ok(OffsetDateTime::now_utc())
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.inner.lock().unwrap().users.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.inner.lock().unwrap().users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.username_taken(&user.username, None) {
            return Err(RepoError::UsernameTaken);
        }
        inner.last_id += 1;
        let stored = User {
            id: inner.last_id,
            firstname: user.firstname,
            fullname: user.fullname,
            lastname: user.lastname,
            username: user.username,
            password_hash: user.password_hash,
            status: user.status,
        };
        inner.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<bool, RepoError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.users.contains_key(&id) {
            return Ok(false);
        }
        if inner.username_taken(&changes.username, Some(id)) {
            return Err(RepoError::UsernameTaken);
        }
        if let Some(user) = inner.users.get_mut(&id) {
            user.firstname = changes.firstname;
            user.fullname = changes.fullname;
            user.lastname = changes.lastname;
            user.username = changes.username;
            user.status = changes.status;
            if let Some(hash) = changes.password_hash {
                user.password_hash = hash;
            }
        }
        Ok(true)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        Ok(self.inner.lock().unwrap().users.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            firstname: "Alice".into(),
            fullname: "Alice Liddell".into(),
            lastname: "Liddell".into(),
            username: username.into(),
            password_hash: "$2b$10$hash".into(),
            status: "active".into(),
        }
    }

    #[tokio::test]
    async fn assigns_increasing_ids() {
        let repo = MemoryUserRepo::default();
        let a = repo.create(new_user("alice")).await.unwrap();
        let b = repo.create(new_user("bob")).await.unwrap();
        assert!(b.id > a.id);
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rejects_duplicate_username() {
        let repo = MemoryUserRepo::default();
        repo.create(new_user("alice")).await.unwrap();
        let err = repo.create(new_user("alice")).await.unwrap_err();
        assert!(matches!(err, RepoError::UsernameTaken));
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reused() {
        let repo = MemoryUserRepo::default();
        let a = repo.create(new_user("alice")).await.unwrap();
        assert!(repo.delete(a.id).await.unwrap());
        assert!(!repo.delete(a.id).await.unwrap());
        let b = repo.create(new_user("alice")).await.unwrap();
        assert_ne!(a.id, b.id);
    }
}
