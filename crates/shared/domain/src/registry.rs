//! The persisted user collection.
//!
//! A `Registry` is the whole store document: it is loaded, mutated in
//! memory and written back in one piece. Every rule that needs to see the
//! entire collection (id assignment, uniqueness, the creator forest, the
//! cascading delete) lives here so it can be exercised without I/O.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::listing::{Page, PageRequest, UserFilter};
use crate::user::{NewUser, User, UserPatch};

/// Store document: `{"usuarios": [...], "lastId": n}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub usuarios: Vec<User>,
    /// Highest identifier ever handed out
    #[serde(rename = "lastId", default)]
    pub last_id: i64,
}

/// Records removed by a delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deletion {
    pub removed: User,
    /// Records created by the actor, only populated on self-delete
    pub cascaded: Vec<User>,
}

impl Deletion {
    pub fn count(&self) -> usize {
        1 + self.cascaded.len()
    }
}

impl Registry {
    pub fn new(usuarios: Vec<User>) -> Self {
        let last_id = usuarios.iter().map(|u| u.id).max().unwrap_or(0);
        Self { usuarios, last_id }
    }

    pub fn len(&self) -> usize {
        self.usuarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usuarios.is_empty()
    }

    pub fn users(&self) -> &[User] {
        &self.usuarios
    }

    pub fn find(&self, id: i64) -> Option<&User> {
        self.usuarios.iter().find(|u| u.id == id)
    }

    pub fn find_mut(&mut self, id: i64) -> Option<&mut User> {
        self.usuarios.iter_mut().find(|u| u.id == id)
    }

    pub fn find_by_email(&self, email: &str) -> Option<&User> {
        self.usuarios.iter().find(|u| u.email == email)
    }

    pub fn find_by_email_mut(&mut self, email: &str) -> Option<&mut User> {
        self.usuarios.iter_mut().find(|u| u.email == email)
    }

    /// Identifier for the next insertion, never reusing a past one
    pub fn next_id(&self) -> i64 {
        let max_present = self.usuarios.iter().map(|u| u.id).max().unwrap_or(0);
        max_present.max(self.last_id) + 1
    }

    /// Reject a cpf or email already held by another record.
    ///
    /// cpf is checked first. A `None` field is not checked.
    pub fn ensure_unique(
        &self,
        cpf: Option<&str>,
        email: Option<&str>,
        except: Option<i64>,
    ) -> DomainResult<()> {
        let others = || self.usuarios.iter().filter(move |u| Some(u.id) != except);

        if let Some(cpf) = cpf {
            if others().any(|u| u.cpf == cpf) {
                return Err(DomainError::conflict("CPF"));
            }
        }
        if let Some(email) = email {
            if others().any(|u| u.email == email) {
                return Err(DomainError::conflict("Email"));
            }
        }
        Ok(())
    }

    /// Insert a new record in one step.
    ///
    /// Without an explicit creator the record becomes its own creator.
    pub fn insert(&mut self, new: NewUser) -> DomainResult<&User> {
        self.ensure_unique(Some(&new.cpf), Some(&new.email), None)?;

        if let Some(creator) = new.explicit_creator() {
            if self.find(creator).is_none() {
                return Err(DomainError::validation(format!(
                    "Creator {} does not exist",
                    creator
                )));
            }
        }

        let id = self.next_id();
        let creator = new.explicit_creator().unwrap_or(id);
        self.usuarios.push(User::from_new(id, creator, new));
        self.last_id = id;

        Ok(&self.usuarios[self.usuarios.len() - 1])
    }

    /// Apply a partial update.
    ///
    /// Uniqueness is re-checked only for a cpf or email the patch changes,
    /// so a record already clashing in a legacy file stays editable.
    pub fn patch(&mut self, id: i64, patch: UserPatch) -> DomainResult<&User> {
        let current = self
            .find(id)
            .ok_or_else(|| DomainError::not_found("User"))?;

        let cpf = patch.cpf.as_deref().filter(|cpf| *cpf != current.cpf);
        let email = patch.email.as_deref().filter(|email| *email != current.email);
        self.ensure_unique(cpf, email, Some(id))?;

        let user = self
            .find_mut(id)
            .ok_or_else(|| DomainError::not_found("User"))?;
        patch.apply(user);
        Ok(user)
    }

    /// Remove one record by id
    pub fn remove(&mut self, id: i64) -> Option<User> {
        let index = self.usuarios.iter().position(|u| u.id == id)?;
        Some(self.usuarios.remove(index))
    }

    /// Remove every record whose creator is `creator` (one level only)
    pub fn remove_created_by(&mut self, creator: i64) -> Vec<User> {
        let (removed, kept): (Vec<User>, Vec<User>) = std::mem::take(&mut self.usuarios)
            .into_iter()
            .partition(|u| u.created_by(creator));
        self.usuarios = kept;
        removed
    }

    /// Delete `target` on behalf of `actor`.
    ///
    /// The actor must exist and `password` must equal the actor's stored
    /// password. Deleting oneself also removes every record the actor
    /// created; deleting anyone else never cascades. Nothing is mutated
    /// unless every check passes.
    pub fn delete_as(&mut self, target: i64, actor: i64, password: &str) -> DomainResult<Deletion> {
        let acting = self
            .find(actor)
            .ok_or_else(|| DomainError::not_found("Logged user"))?;

        if !acting.password_matches(password) {
            return Err(DomainError::unauthorized("Incorrect password for logged user"));
        }

        if self.find(target).is_none() {
            return Err(DomainError::not_found("User to delete"));
        }

        let removed = self
            .remove(target)
            .ok_or_else(|| DomainError::not_found("User to delete"))?;

        let cascaded = if target == actor {
            self.remove_created_by(actor)
        } else {
            Vec::new()
        };

        Ok(Deletion { removed, cascaded })
    }

    /// Records created by the filter's owner matching its search, paginated
    pub fn list(&self, filter: &UserFilter, request: PageRequest) -> Page<&User> {
        Page::collect(self.usuarios.iter().filter(|u| filter.matches(u)), request)
    }
}
