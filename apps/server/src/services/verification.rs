//! Verification service - the verified/unverified toggle on business records
//!
//! Callers are responsible for authorization: the HTTP layer authenticates the
//! admin and passes only its identifier in here.

use crate::{
    db::BusinessStore,
    models::{Business, Verification, VerificationStats, VerificationStatus},
    Error, Result,
};
use chrono::Utc;
use std::sync::Arc;

pub struct VerificationService {
    store: Arc<dyn BusinessStore>,
}

fn verification_failed(operation: &'static str) -> impl FnOnce(Error) -> Error {
    move |e| Error::VerificationFailed(format!("{operation}: {e}"))
}

impl VerificationService {
    pub fn new(store: Arc<dyn BusinessStore>) -> Self {
        Self { store }
    }

    /// Mark a business verified by `admin_id`.
    ///
    /// Re-verifying refreshes `verified_at` and `verified_by`.
    pub async fn verify(&self, business_id: &str, admin_id: &str) -> Result<Business> {
        if admin_id.trim().is_empty() {
            return Err(Error::Validation("Admin identifier is required".into()));
        }

        let verification = Verification {
            verified_at: Utc::now(),
            verified_by: admin_id.to_string(),
        };
        let business = self
            .update(business_id, Some(verification), "verify business")
            .await?;

        tracing::info!(business_id, admin_id, "Business verified");
        Ok(business)
    }

    /// Clear the verified triple of a business.
    pub async fn unverify(&self, business_id: &str) -> Result<Business> {
        let business = self
            .update(business_id, None, "unverify business")
            .await?;

        tracing::info!(business_id, "Business unverified");
        Ok(business)
    }

    /// Apply `verified` as requested by an admin toggle.
    pub async fn set_verified(
        &self,
        business_id: &str,
        verified: bool,
        admin_id: &str,
    ) -> Result<Business> {
        if verified {
            self.verify(business_id, admin_id).await
        } else {
            self.unverify(business_id).await
        }
    }

    pub async fn get_status(&self, business_id: &str) -> Result<Option<VerificationStatus>> {
        let business = self
            .store
            .get(business_id)
            .await
            .map_err(verification_failed("get verification status"))?;
        Ok(business.map(|b| b.verification_status()))
    }

    /// Verified businesses, most recently verified first.
    pub async fn list_verified(&self, limit: Option<u32>) -> Result<Vec<Business>> {
        self.store
            .list_by_verification(true, limit.map(i64::from))
            .await
            .map_err(verification_failed("list verified businesses"))
    }

    /// Businesses awaiting verification, newest first.
    pub async fn list_unverified(&self, limit: Option<u32>) -> Result<Vec<Business>> {
        self.store
            .list_by_verification(false, limit.map(i64::from))
            .await
            .map_err(verification_failed("list unverified businesses"))
    }

    pub async fn stats(&self) -> Result<VerificationStats> {
        let (total, verified, unverified) = tokio::try_join!(
            self.store.count(None),
            self.store.count(Some(true)),
            self.store.count(Some(false)),
        )
        .map_err(verification_failed("verification stats"))?;

        Ok(VerificationStats {
            total,
            verified,
            unverified,
        })
    }

    async fn update(
        &self,
        business_id: &str,
        verification: Option<Verification>,
        operation: &'static str,
    ) -> Result<Business> {
        let updated = self
            .store
            .set_verification(business_id, verification)
            .await
            .map_err(verification_failed(operation))?;

        updated.ok_or_else(|| Error::BusinessNotFound {
            id: business_id.to_string(),
        })
    }
}
