//! User service - Handles user-related business logic.
//!
//! Every operation loads the whole collection. Mutations run inside one
//! process-wide lock, apply their change to the loaded copy and save it
//! only if every check passed, so a rejected request never touches the
//! store.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use common::{AppError, AppResult, OptionExt};
use domain::{is_valid_email, Deletion, NewUser, Page, PageRequest, Registry, User, UserFilter, UserPatch};

use crate::repository::UserRepository;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Records created by `owner` matching `search`, one page at a time
    async fn list_users(
        &self,
        owner: i64,
        search: Option<String>,
        page: PageRequest,
    ) -> AppResult<Page<User>>;

    /// Get a user by ID
    async fn get_user(&self, id: i64) -> AppResult<User>;

    /// Get a user by email
    async fn get_user_by_email(&self, email: &str) -> AppResult<User>;

    /// Create a new user, defaulting the creator to the new record itself
    async fn create_user(&self, new: NewUser) -> AppResult<User>;

    /// Change a user's name
    async fn rename_user(&self, id: i64, name: String) -> AppResult<User>;

    /// Overwrite the creator reference
    async fn set_creator(&self, id: i64, creator_id: Option<i64>) -> AppResult<User>;

    /// Merge a partial update into a user
    async fn edit_user(&self, id: i64, patch: UserPatch) -> AppResult<User>;

    /// Delete `target` as `actor`, cascading on self-delete
    async fn delete_user(&self, target: i64, actor: i64, password: &str) -> AppResult<Deletion>;

    /// Store a freshly issued reset code on the user owning `email`
    async fn store_reset_code(&self, email: &str, code: String) -> AppResult<User>;

    /// Replace the password if `code` matches the pending reset code
    async fn reset_password(&self, email: &str, code: &str, new_password: String)
        -> AppResult<User>;

    /// Clear a matching reset code. Returns false if none was pending.
    async fn clear_reset_code(&self, email: &str, code: &str) -> AppResult<bool>;

    /// Number of stored records
    async fn count_users(&self) -> AppResult<usize>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
    write_lock: Mutex<()>,
}

impl UserManager {
    /// Create new user service instance with repository
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self {
            repo,
            write_lock: Mutex::new(()),
        }
    }

    /// Load, apply `f`, and save only if `f` succeeded.
    async fn mutate<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut Registry) -> AppResult<T> + Send,
        T: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut registry = self.repo.load().await?;
        let result = f(&mut registry)?;
        self.repo.save(&registry).await?;
        Ok(result)
    }
}

fn ensure_email_shape(email: &str) -> AppResult<()> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(AppError::validation("Invalid email format"))
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn list_users(
        &self,
        owner: i64,
        search: Option<String>,
        page: PageRequest,
    ) -> AppResult<Page<User>> {
        let registry = self.repo.load().await?;
        let filter = UserFilter::new(owner, search.as_deref());
        let result = registry.list(&filter, page).map(User::clone);

        debug!(
            owner,
            page = page.page,
            per_page = page.per_page,
            total = result.total,
            "Listed users"
        );
        Ok(result)
    }

    async fn get_user(&self, id: i64) -> AppResult<User> {
        self.repo.load().await?.find(id).cloned().ok_or_not_found("User")
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<User> {
        self.repo
            .load()
            .await?
            .find_by_email(email)
            .cloned()
            .ok_or_not_found("Email")
    }

    async fn create_user(&self, new: NewUser) -> AppResult<User> {
        ensure_email_shape(&new.email)?;

        let user = self
            .mutate(move |registry| Ok(registry.insert(new)?.clone()))
            .await?;

        info!(id = user.id, creator = ?user.creator_id, "User created");
        Ok(user)
    }

    async fn rename_user(&self, id: i64, name: String) -> AppResult<User> {
        if name.trim().is_empty() {
            return Err(AppError::validation("Name is required"));
        }

        self.mutate(move |registry| {
            let user = registry.find_mut(id).ok_or_not_found("User")?;
            user.name = name;
            Ok(user.clone())
        })
        .await
    }

    async fn set_creator(&self, id: i64, creator_id: Option<i64>) -> AppResult<User> {
        let user = self
            .mutate(move |registry| {
                let user = registry.find_mut(id).ok_or_not_found("User")?;
                user.creator_id = creator_id;
                Ok(user.clone())
            })
            .await?;

        info!(id, creator = ?creator_id, "Creator reference updated");
        Ok(user)
    }

    async fn edit_user(&self, id: i64, patch: UserPatch) -> AppResult<User> {
        if let Some(email) = patch.email.as_deref() {
            ensure_email_shape(email)?;
        }

        self.mutate(move |registry| Ok(registry.patch(id, patch)?.clone()))
            .await
    }

    async fn delete_user(&self, target: i64, actor: i64, password: &str) -> AppResult<Deletion> {
        let password = password.to_string();
        let deletion = self
            .mutate(move |registry| registry.delete_as(target, actor, &password).map_err(AppError::from))
            .await?;

        info!(
            target,
            actor,
            cascaded = deletion.cascaded.len(),
            "User deleted"
        );
        Ok(deletion)
    }

    async fn store_reset_code(&self, email: &str, code: String) -> AppResult<User> {
        let email = email.to_string();
        self.mutate(move |registry| {
            let user = registry.find_by_email_mut(&email).ok_or_not_found("Email")?;
            user.reset_code = code;
            Ok(user.clone())
        })
        .await
    }

    async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: String,
    ) -> AppResult<User> {
        if new_password.is_empty() {
            return Err(AppError::validation("New password is required"));
        }

        let email = email.to_string();
        let code = code.to_string();
        self.mutate(move |registry| {
            let user = registry.find_by_email_mut(&email).ok_or_not_found("Email")?;
            if !user.reset_code_matches(&code) {
                return Err(AppError::unauthorized("Invalid reset code"));
            }
            user.rotate_password(new_password);
            Ok(user.clone())
        })
        .await
    }

    async fn clear_reset_code(&self, email: &str, code: &str) -> AppResult<bool> {
        let email = email.to_string();
        let code = code.to_string();
        self.mutate(move |registry| {
            let user = registry.find_by_email_mut(&email).ok_or_not_found("Email")?;
            if !user.has_pending_reset() {
                return Ok(false);
            }
            if !user.reset_code_matches(&code) {
                return Err(AppError::unauthorized("Invalid reset code"));
            }
            user.reset_code.clear();
            Ok(true)
        })
        .await
    }

    async fn count_users(&self) -> AppResult<usize> {
        Ok(self.repo.load().await?.len())
    }
}
