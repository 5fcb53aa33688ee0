//! Password reset codes and the client-side reset flow.
//!
//! The server issues a short numeric code and keeps a copy on the user
//! record. The client caches the same code, checks the digits the user
//! types against it locally, and only then submits the new password
//! together with the code so the server can check it again.
//!
//! Codes never expire and attempts are not limited.

use rand::Rng;

use crate::constants::RESET_CODE_LENGTH;
use crate::error::{DomainError, DomainResult};

/// A numeric reset code of `RESET_CODE_LENGTH` digits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetCode(String);

impl ResetCode {
    /// Generate a fresh random code
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let code = (0..RESET_CODE_LENGTH)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        Self(code)
    }

    /// Join individually entered digits into a code.
    ///
    /// Each entry must be exactly one ASCII digit.
    pub fn from_digits<S: AsRef<str>>(digits: &[S]) -> DomainResult<Self> {
        if digits.len() != RESET_CODE_LENGTH {
            return Err(DomainError::validation(format!(
                "Reset code must have {} digits",
                RESET_CODE_LENGTH
            )));
        }

        let mut code = String::with_capacity(RESET_CODE_LENGTH);
        for digit in digits {
            let digit = digit.as_ref();
            if digit.len() != 1 || !digit.bytes().all(|b| b.is_ascii_digit()) {
                return Err(DomainError::validation("Reset code digits must be 0-9"));
            }
            code.push_str(digit);
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ResetCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client-side state of a password reset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResetFlow {
    #[default]
    NoRequest,
    TokenIssued {
        email: String,
        code: String,
    },
    TokenValidated {
        email: String,
        code: String,
    },
    Completed,
}

impl ResetFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a reset request.
    ///
    /// `issued` is the code returned by the server, `None` when the lookup
    /// failed. A failed lookup is reported as an unknown email and leaves
    /// the flow where it was. A new request replaces any cached code.
    pub fn request(&mut self, email: impl Into<String>, issued: Option<String>) -> DomainResult<()> {
        let code = issued.ok_or_else(|| DomainError::not_found("Email"))?;
        *self = ResetFlow::TokenIssued {
            email: email.into(),
            code,
        };
        Ok(())
    }

    /// Compare the entered code against the cached one.
    ///
    /// Exact string equality, no server round-trip. A mismatch keeps the
    /// flow in `TokenIssued`.
    pub fn validate(&mut self, entered: &str) -> DomainResult<()> {
        let (email, code) = match self {
            ResetFlow::TokenIssued { email, code } | ResetFlow::TokenValidated { email, code } => {
                (email.clone(), code.clone())
            }
            _ => return Err(DomainError::validation("No reset code was requested")),
        };

        if code != entered {
            *self = ResetFlow::TokenIssued { email, code };
            return Err(DomainError::unauthorized("Invalid reset code"));
        }

        *self = ResetFlow::TokenValidated { email, code };
        Ok(())
    }

    /// Email and code to submit with the new password, once validated
    pub fn submission(&self) -> Option<(&str, &str)> {
        match self {
            ResetFlow::TokenValidated { email, code } => Some((email.as_str(), code.as_str())),
            _ => None,
        }
    }

    /// Apply the server's verdict on the password change.
    ///
    /// Acceptance discards the cached code; rejection returns to
    /// `TokenIssued` with the cache intact.
    pub fn finish(&mut self, accepted: bool) -> DomainResult<()> {
        let (email, code) = match self {
            ResetFlow::TokenValidated { email, code } => (email.clone(), code.clone()),
            _ => return Err(DomainError::validation("Reset code was not validated")),
        };

        *self = if accepted {
            ResetFlow::Completed
        } else {
            ResetFlow::TokenIssued { email, code }
        };
        Ok(())
    }

    /// Locally cached code, if any
    pub fn cached_code(&self) -> Option<&str> {
        match self {
            ResetFlow::TokenIssued { code, .. } | ResetFlow::TokenValidated { code, .. } => {
                Some(code.as_str())
            }
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ResetFlow::Completed)
    }
}
