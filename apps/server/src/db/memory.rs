//! In-process `BusinessStore` implementation.
//!
//! Records live in a map guarded by an async `RwLock`. The lock is held for
//! exactly one operation, which gives the same single-row semantics as the
//! PostgreSQL store (last writer wins).
//!
//! Primary use-cases: integration tests and local development without a database.

use async_trait::async_trait;
use chrono::Utc;
use std::{cmp::Ordering, collections::HashMap};
use tokio::sync::RwLock;

use crate::{
    db::traits::BusinessStore,
    models::{normalize_registration_number, Business, NewBusiness, Verification},
    Error, Result,
};

#[derive(Default)]
pub struct InMemoryBusinessStore {
    records: RwLock<HashMap<String, Business>>,
}

impl InMemoryBusinessStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Case-insensitive name order with a byte-wise tie-break, as the SQL store
/// orders by `LOWER(name) COLLATE "C", name COLLATE "C"`.
fn name_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn search_order(a: &Business, b: &Business) -> Ordering {
    b.verified
        .cmp(&a.verified)
        .then_with(|| name_order(&a.name, &b.name))
        .then_with(|| a.id.cmp(&b.id))
}

fn listing_order(a: &Business, b: &Business) -> Ordering {
    b.verified
        .cmp(&a.verified)
        .then_with(|| b.updated_at.cmp(&a.updated_at))
        .then_with(|| a.id.cmp(&b.id))
}

fn to_usize(value: i64) -> usize {
    usize::try_from(value.max(0)).unwrap_or(usize::MAX)
}

#[async_trait]
impl BusinessStore for InMemoryBusinessStore {
    async fn insert(&self, new: NewBusiness) -> Result<Business> {
        new.check()?;
        let record = Business::from_new(new, Utc::now());

        let mut records = self.records.write().await;
        if records
            .values()
            .any(|b| b.registration_number == record.registration_number)
        {
            return Err(Error::DuplicateRegistration {
                registration_number: record.registration_number,
            });
        }
        records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn get(&self, id: &str) -> Result<Option<Business>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn find_by_registration_number(
        &self,
        registration_number: &str,
    ) -> Result<Option<Business>> {
        let wanted = normalize_registration_number(registration_number);
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|b| b.registration_number == wanted)
            .cloned())
    }

    async fn search_by_name(&self, query: &str, limit: i64) -> Result<Vec<Business>> {
        let needle = query.to_lowercase();
        let mut matches: Vec<Business> = self
            .records
            .read()
            .await
            .values()
            .filter(|b| contains_ignore_case(&b.name, &needle))
            .cloned()
            .collect();
        matches.sort_by(search_order);
        matches.truncate(to_usize(limit));
        Ok(matches)
    }

    async fn suggest_names(
        &self,
        name_fragment: &str,
        business_type: &str,
        limit: i64,
    ) -> Result<Vec<String>> {
        let fragment = name_fragment.to_lowercase();
        let type_needle = business_type.to_lowercase();

        let mut names: Vec<String> = self
            .records
            .read()
            .await
            .values()
            .filter(|b| {
                contains_ignore_case(&b.name, &fragment)
                    || b.business_type
                        .as_deref()
                        .is_some_and(|t| contains_ignore_case(t, &type_needle))
            })
            .map(|b| b.name.clone())
            .collect();
        names.sort_by(|a, b| name_order(a, b));
        names.dedup();
        names.truncate(to_usize(limit));
        Ok(names)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Business>> {
        let mut all: Vec<Business> = self.records.read().await.values().cloned().collect();
        all.sort_by(listing_order);
        Ok(all
            .into_iter()
            .skip(to_usize(offset))
            .take(to_usize(limit))
            .collect())
    }

    async fn list_by_verification(
        &self,
        verified: bool,
        limit: Option<i64>,
    ) -> Result<Vec<Business>> {
        let mut rows: Vec<Business> = self
            .records
            .read()
            .await
            .values()
            .filter(|b| b.verified == verified)
            .cloned()
            .collect();
        if verified {
            rows.sort_by(|a, b| b.verified_at.cmp(&a.verified_at).then(a.id.cmp(&b.id)));
        } else {
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        }
        if let Some(limit) = limit {
            rows.truncate(to_usize(limit));
        }
        Ok(rows)
    }

    async fn count(&self, verified: Option<bool>) -> Result<i64> {
        let records = self.records.read().await;
        let count = match verified {
            Some(state) => records.values().filter(|b| b.verified == state).count(),
            None => records.len(),
        };
        Ok(count as i64)
    }

    async fn set_verification(
        &self,
        id: &str,
        verification: Option<Verification>,
    ) -> Result<Option<Business>> {
        let mut records = self.records.write().await;
        let Some(business) = records.get_mut(id) else {
            return Ok(None);
        };
        business.apply_verification(verification, Utc::now());
        Ok(Some(business.clone()))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_registration_numbers_are_rejected_case_insensitively() {
        let store = InMemoryBusinessStore::new();
        store
            .insert(NewBusiness::new("Acme Traders", "SL-0001", "Jane Doe"))
            .await
            .unwrap();

        let err = store
            .insert(NewBusiness::new("Other", "sl-0001", "John Roe"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateRegistration { .. }));
        assert_eq!(store.count(None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn set_verification_on_unknown_id_returns_none() {
        let store = InMemoryBusinessStore::new();
        let result = store
            .set_verification(
                "missing",
                Some(Verification {
                    verified_at: Utc::now(),
                    verified_by: "admin".into(),
                }),
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn suggestions_are_distinct_and_sorted() {
        let store = InMemoryBusinessStore::new();
        store
            .insert(NewBusiness::new("Zeta Bakery", "SL-1", "A"))
            .await
            .unwrap();
        store
            .insert(NewBusiness::new("Zeta Bakery", "SL-2", "B"))
            .await
            .unwrap();
        store
            .insert(NewBusiness::new("Alpha Foods", "SL-3", "C").with_business_type("Bakery"))
            .await
            .unwrap();

        let names = store.suggest_names("bak", "bakery", 5).await.unwrap();
        assert_eq!(names, vec!["Alpha Foods".to_string(), "Zeta Bakery".to_string()]);
    }

    #[tokio::test]
    async fn name_ordering_ignores_case() {
        let store = InMemoryBusinessStore::new();
        store
            .insert(NewBusiness::new("Zeta Market", "SL-10", "A"))
            .await
            .unwrap();
        store
            .insert(NewBusiness::new("acme market", "SL-11", "B"))
            .await
            .unwrap();
        store
            .insert(NewBusiness::new("Bo Market", "SL-12", "C"))
            .await
            .unwrap();

        let names: Vec<String> = store
            .search_by_name("market", 10)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["acme market", "Bo Market", "Zeta Market"]);

        let suggestions = store.suggest_names("mar", "", 10).await.unwrap();
        assert_eq!(suggestions, vec!["acme market", "Bo Market", "Zeta Market"]);
    }
}
