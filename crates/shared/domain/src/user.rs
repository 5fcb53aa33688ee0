//! User domain entity and related types.
//!
//! The persisted JSON keeps the legacy field names (`nome`, `cpf`,
//! `IdUserCreate`, ...) so existing store files and front ends keep working.

use serde::{Deserialize, Serialize};

/// User record as persisted in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(default)]
    pub cpf: String,
    #[serde(rename = "telefone", default)]
    pub phone: String,
    #[serde(default)]
    pub cep: String,
    #[serde(rename = "endereco", default)]
    pub address: String,
    #[serde(rename = "numero", default)]
    pub number: String,
    #[serde(rename = "complemento", default)]
    pub complement: String,
    #[serde(rename = "cidade", default)]
    pub city: String,
    #[serde(rename = "estado", default)]
    pub state: String,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
    /// Stored and compared as plain text
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
    /// Identifier of the user who created this record
    #[serde(rename = "IdUserCreate", default)]
    pub creator_id: Option<i64>,
    /// Pending password reset code, empty when none was requested
    #[serde(rename = "resetCode", default)]
    pub reset_code: String,
}

impl User {
    /// Build a record from creation data with an assigned identifier.
    ///
    /// The reset code always starts empty.
    pub fn from_new(id: i64, creator_id: i64, new: NewUser) -> Self {
        Self {
            id,
            name: new.name,
            cpf: new.cpf,
            phone: new.phone,
            cep: new.cep,
            address: new.address,
            number: new.number,
            complement: new.complement.unwrap_or_default(),
            city: new.city,
            state: new.state,
            latitude: new.latitude,
            longitude: new.longitude,
            password: new.password,
            email: new.email,
            creator_id: Some(creator_id),
            reset_code: String::new(),
        }
    }

    /// Check if the record was created by `creator`
    pub fn created_by(&self, creator: i64) -> bool {
        self.creator_id == Some(creator)
    }

    /// Check if the record is a root of the creator forest
    pub fn is_root(&self) -> bool {
        match self.creator_id {
            None => true,
            Some(creator) => creator == self.id,
        }
    }

    /// Exact plain-text password comparison
    pub fn password_matches(&self, password: &str) -> bool {
        self.password == password
    }

    /// Check if a reset code is pending and equals `code`
    pub fn reset_code_matches(&self, code: &str) -> bool {
        !self.reset_code.is_empty() && self.reset_code == code
    }

    /// Check if a reset code is pending
    pub fn has_pending_reset(&self) -> bool {
        !self.reset_code.is_empty()
    }

    /// Replace the password and invalidate any pending reset code
    pub fn rotate_password(&mut self, new_password: String) {
        self.password = new_password;
        self.reset_code.clear();
    }
}

/// User creation data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub cpf: String,
    pub phone: String,
    pub cep: String,
    pub address: String,
    pub number: String,
    pub complement: Option<String>,
    pub city: String,
    pub state: String,
    pub latitude: String,
    pub longitude: String,
    pub password: String,
    pub email: String,
    /// `None` (or `Some(0)`) makes the new record its own creator
    pub creator_id: Option<i64>,
}

impl NewUser {
    /// Creator to record, `None` when the record should refer to itself
    pub fn explicit_creator(&self) -> Option<i64> {
        self.creator_id.filter(|id| *id != 0)
    }
}

/// Partial update of profile fields.
///
/// `id`, `IdUserCreate` and `resetCode` are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPatch {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    pub cpf: Option<String>,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    pub cep: Option<String>,
    #[serde(rename = "endereco")]
    pub address: Option<String>,
    #[serde(rename = "numero")]
    pub number: Option<String>,
    #[serde(rename = "complemento")]
    pub complement: Option<String>,
    #[serde(rename = "cidade")]
    pub city: Option<String>,
    #[serde(rename = "estado")]
    pub state: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

impl UserPatch {
    /// Merge provided fields into `user`
    pub fn apply(self, user: &mut User) {
        let fields = [
            (self.name, &mut user.name),
            (self.cpf, &mut user.cpf),
            (self.phone, &mut user.phone),
            (self.cep, &mut user.cep),
            (self.address, &mut user.address),
            (self.number, &mut user.number),
            (self.complement, &mut user.complement),
            (self.city, &mut user.city),
            (self.state, &mut user.state),
            (self.latitude, &mut user.latitude),
            (self.longitude, &mut user.longitude),
            (self.password, &mut user.password),
            (self.email, &mut user.email),
        ];

        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserResponse {
    /// Unique user identifier
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    pub cpf: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    pub cep: String,
    #[serde(rename = "endereco")]
    pub address: String,
    #[serde(rename = "numero")]
    pub number: String,
    #[serde(rename = "complemento")]
    pub complement: String,
    #[serde(rename = "cidade")]
    pub city: String,
    #[serde(rename = "estado")]
    pub state: String,
    pub latitude: String,
    pub longitude: String,
    pub email: String,
    /// Identifier of the creating user
    #[serde(rename = "IdUserCreate")]
    pub creator_id: Option<i64>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            cpf: user.cpf.clone(),
            phone: user.phone.clone(),
            cep: user.cep.clone(),
            address: user.address.clone(),
            number: user.number.clone(),
            complement: user.complement.clone(),
            city: user.city.clone(),
            state: user.state.clone(),
            latitude: user.latitude.clone(),
            longitude: user.longitude.clone(),
            email: user.email.clone(),
            creator_id: user.creator_id,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse::from(&user)
    }
}
