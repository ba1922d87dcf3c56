//! Cursor advancement.
//!
//! A cursor chain moves Initial → Advancing → Terminal. The empty string is
//! the terminal marker for both pagination styles.

use crate::adapter::PageSelector;
use crate::error::SyncError;
use serde::Serialize;
use skyledger_core::Cursor;

/// How a resource paginates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pagination {
    /// Cursor is a 1-based page number; the vendor reports a total count.
    PageNumber,
    /// Cursor is the vendor's continuation token, passed through verbatim.
    Token,
}

impl Pagination {
    /// Marker a fresh chain starts from.
    pub fn initial_marker(self) -> &'static str {
        match self {
            Pagination::PageNumber => "1",
            Pagination::Token => "",
        }
    }
}

/// Turn an incoming marker into the page to request.
///
/// `Ok(None)` means the chain is already exhausted and nothing is fetched.
pub fn start(
    pagination: Pagination,
    resource: &str,
    marker: &str,
) -> Result<Option<PageSelector>, SyncError> {
    match pagination {
        Pagination::PageNumber => {
            let trimmed = marker.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            match trimmed.parse::<u32>() {
                Ok(page) if page >= 1 => Ok(Some(PageSelector::Number(page))),
                _ => Err(SyncError::parse(resource, marker)),
            }
        }
        Pagination::Token => Ok(Some(PageSelector::Token(marker.to_string()))),
    }
}

/// Next cursor after `page` of a page-number chain.
///
/// Fails when more records remain but the next page number does not fit a
/// marker.
pub fn advance_page(
    resource: &str,
    page: u32,
    page_size: u32,
    total: i64,
) -> Result<Cursor, SyncError> {
    let seen = u64::from(page) * u64::from(page_size);
    if total <= 0 || seen >= total.unsigned_abs() {
        return Ok(Cursor::new());
    }
    match page.checked_add(1) {
        Some(next) => Ok(next.to_string()),
        None => Err(SyncError::parse(resource, &page.to_string())),
    }
}

/// Next cursor of a token chain: the vendor's token, or terminal when absent.
pub fn advance_token(token: Option<String>) -> Cursor {
    token.unwrap_or_default()
}
