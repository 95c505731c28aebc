//! Page-number pagination shared by the update, poll and feed listings.

/// Items per page for every listing.
pub const ITEMS_PER_PAGE: u64 = 10;

/// Highest page whose `offset + limit + 1` still fits a signed 64-bit bind
/// parameter.
const MAX_PAGE: u64 = (i64::MAX.unsigned_abs() - ITEMS_PER_PAGE - 1) / ITEMS_PER_PAGE + 1;

/// A 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
}

impl PageRequest {
    /// Page `page`, clamped to `1..=MAX_PAGE`.
    #[must_use]
    pub fn new(page: i64) -> Self {
        Self {
            page: u64::try_from(page).unwrap_or(0).clamp(1, MAX_PAGE),
        }
    }

    /// Parse a `?page=` query value. Missing or non-numeric values mean page 1.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse::<i64>().ok())
            .map_or_else(Self::default, Self::new)
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn number(self) -> u64 {
        self.page
    }

    /// Rows to skip.
    #[must_use]
    pub const fn offset(self) -> u64 {
        (self.page - 1) * ITEMS_PER_PAGE
    }

    /// Rows per page.
    #[must_use]
    pub const fn limit(self) -> u64 {
        ITEMS_PER_PAGE
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1 }
    }
}
