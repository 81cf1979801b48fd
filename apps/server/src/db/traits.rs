//! Record store trait definition

use crate::{
    models::{Business, NewBusiness, Verification},
    Result,
};
use async_trait::async_trait;

/// Abstract interface over the persistent table of business records.
///
/// Implementations own durability and the registration-number uniqueness
/// constraint. Every call is a single independent operation; callers never
/// hold records across calls.
#[async_trait]
pub trait BusinessStore: Send + Sync {
    /// Insert a new, unverified record.
    ///
    /// Fails with `DuplicateRegistration` when the normalized registration
    /// number is already taken.
    async fn insert(&self, new: NewBusiness) -> Result<Business>;

    /// Get a record by its identifier
    async fn get(&self, id: &str) -> Result<Option<Business>>;

    /// Exact lookup on an already-normalized registration number
    async fn find_by_registration_number(&self, registration_number: &str)
        -> Result<Option<Business>>;

    /// Case-insensitive substring match on name, verified first then by name.
    async fn search_by_name(&self, query: &str, limit: i64) -> Result<Vec<Business>>;

    /// Distinct names containing `name_fragment` or whose business type
    /// contains `business_type`, both case-insensitive, ordered by name.
    async fn suggest_names(
        &self,
        name_fragment: &str,
        business_type: &str,
        limit: i64,
    ) -> Result<Vec<String>>;

    /// Page of records, verified first then most recently updated first.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Business>>;

    /// Verified records by `verified_at` desc, or unverified ones by
    /// `created_at` desc. `None` means no limit.
    async fn list_by_verification(&self, verified: bool, limit: Option<i64>)
        -> Result<Vec<Business>>;

    /// Count records, optionally restricted to one verification state.
    async fn count(&self, verified: Option<bool>) -> Result<i64>;

    /// Replace the verified triple of one record in a single update.
    ///
    /// Returns `None` when no record has this id.
    async fn set_verification(
        &self,
        id: &str,
        verification: Option<Verification>,
    ) -> Result<Option<Business>>;

    /// Round-trip to the backing store
    async fn health_check(&self) -> Result<()>;
}

/// Escape `LIKE`/`ILIKE` wildcards so user input is matched literally.
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
