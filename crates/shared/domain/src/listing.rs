//! Ownership-scoped search and pagination over the user collection.

use serde::Serialize;

use crate::constants::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE};
use crate::user::User;

/// 1-based page request.
///
/// Both values are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build from raw query values.
    ///
    /// Only the leading integer of each value counts, so `2.5` and `3abc`
    /// read as 2 and 3. Missing, non-numeric or zero values fall back to
    /// the defaults; negative values clamp to 1.
    pub fn from_query(page: Option<&str>, per_page: Option<&str>) -> Self {
        Self {
            page: parse_positive(page, DEFAULT_PAGE_NUMBER),
            per_page: parse_positive(per_page, DEFAULT_PAGE_SIZE),
        }
    }

    /// Build from explicit numbers, clamping both to at least 1
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Index of the first item on this page
    pub fn offset(&self) -> usize {
        usize::try_from(self.page.saturating_sub(1).saturating_mul(self.per_page))
            .unwrap_or(usize::MAX)
    }

    /// Number of items on a full page
    pub fn limit(&self) -> usize {
        usize::try_from(self.per_page).unwrap_or(usize::MAX)
    }

    /// Number of pages needed for `total` items
    pub fn total_pages(&self, total: usize) -> u64 {
        (total as u64).div_ceil(self.per_page)
    }
}

fn parse_positive(raw: Option<&str>, default: u64) -> u64 {
    match raw.and_then(leading_integer) {
        None | Some(0) => default,
        Some(value) if value < 0 => 1,
        Some(value) => value as u64,
    }
}

/// Optional sign followed by at least one digit, ignoring whatever follows
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['-', '+']));
    let digits = trimmed[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }

    let number = &trimmed[..sign_len + digits];
    number.parse::<i64>().ok().or_else(|| {
        // Too many digits for i64; the sign alone decides
        Some(if number.starts_with('-') { -1 } else { i64::MAX })
    })
}

/// Selects the records created by `owner` that match `search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFilter {
    owner: i64,
    search: String,
    search_lower: String,
}

impl UserFilter {
    pub fn new(owner: i64, search: Option<&str>) -> Self {
        let search = search.unwrap_or_default().to_string();
        let search_lower = search.to_lowercase();
        Self {
            owner,
            search,
            search_lower,
        }
    }

    pub fn owner(&self) -> i64 {
        self.owner
    }

    /// Name and email match case-insensitively, cpf matches verbatim.
    pub fn matches(&self, user: &User) -> bool {
        if !user.created_by(self.owner) {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }

        user.name.to_lowercase().contains(&self.search_lower)
            || user.email.to_lowercase().contains(&self.search_lower)
            || user.cpf.contains(&self.search)
    }
}

/// One page of results plus the size of the whole filtered set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub total: usize,
    #[serde(rename = "usuarios")]
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Slice an already-filtered iterator, keeping its order
    pub fn collect<I>(filtered: I, request: PageRequest) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let all: Vec<T> = filtered.into_iter().collect();
        let total = all.len();
        let items = all
            .into_iter()
            .skip(request.offset())
            .take(request.limit())
            .collect();

        Self { total, items }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total: self.total,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}
