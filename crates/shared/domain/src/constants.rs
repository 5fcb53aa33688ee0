//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

use once_cell::sync::Lazy;
use regex::Regex;

// =============================================================================
// Listing
// =============================================================================

/// Default page number when the query omits it or sends garbage
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

/// Default number of records per page
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Header carrying the identity of the requesting user
pub const REQUESTING_USER_HEADER: &str = "user-id";

// =============================================================================
// Validation
// =============================================================================

/// Email shape accepted on creation and edits: `something@something.tld`
pub static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Check if an email has the accepted shape
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

// =============================================================================
// Password reset
// =============================================================================

/// Number of digits in a reset code
pub const RESET_CODE_LENGTH: usize = 4;

// =============================================================================
// Authentication
// =============================================================================

/// Default JWT token expiration in hours
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24;

/// Seconds per hour (for token expiration calculation)
pub const SECONDS_PER_HOUR: i64 = 3600;

/// JWT token type identifier
pub const TOKEN_TYPE_BEARER: &str = "Bearer";
