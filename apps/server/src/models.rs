//! Domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A registered business and its verification state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: String,
    pub name: String,
    pub registration_number: String,
    pub owner: String,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub business_type: Option<String>,
    pub date_registered: Option<DateTime<Utc>>,
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
    pub ipfs_hash: Option<String>,
    pub solana_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Business {
    /// Build a fresh, unverified record from an insert payload.
    pub fn from_new(new: NewBusiness, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            registration_number: normalize_registration_number(&new.registration_number),
            owner: new.owner.trim().to_string(),
            address: new.address,
            phone_number: new.phone_number,
            email: new.email,
            business_type: new.business_type,
            date_registered: new.date_registered,
            verified: false,
            verified_at: None,
            verified_by: None,
            ipfs_hash: new.ipfs_hash,
            solana_hash: new.solana_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the verified triple as one unit and advance `updated_at`.
    pub fn apply_verification(&mut self, verification: Option<Verification>, now: DateTime<Utc>) {
        match verification {
            Some(v) => {
                self.verified = true;
                self.verified_at = Some(v.verified_at);
                self.verified_by = Some(v.verified_by);
            }
            None => {
                self.verified = false;
                self.verified_at = None;
                self.verified_by = None;
            }
        }
        self.updated_at = now;
    }

    pub fn verification_status(&self) -> VerificationStatus {
        VerificationStatus {
            verified: self.verified,
            verified_at: self.verified_at,
            verified_by: self.verified_by.clone(),
        }
    }
}

/// The verified half of the two-state toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub verified_at: DateTime<Utc>,
    pub verified_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationStatus {
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
}

/// Insert payload for a business record.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBusiness {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(custom(function = "not_blank"))]
    pub registration_number: String,
    #[validate(custom(function = "not_blank"))]
    pub owner: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub date_registered: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ipfs_hash: Option<String>,
    #[serde(default)]
    pub solana_hash: Option<String>,
}

impl NewBusiness {
    pub fn new(
        name: impl Into<String>,
        registration_number: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            registration_number: registration_number.into(),
            owner: owner.into(),
            ..Default::default()
        }
    }

    pub fn with_business_type(mut self, business_type: impl Into<String>) -> Self {
        self.business_type = Some(business_type.into());
        self
    }

    /// Run field validation, reporting the offending fields by name.
    pub fn check(&self) -> crate::Result<()> {
        self.validate().map_err(|errors| {
            let mut fields: Vec<String> =
                errors.field_errors().keys().map(|k| k.to_string()).collect();
            fields.sort_unstable();
            crate::Error::Validation(format!("Invalid business fields: {}", fields.join(", ")))
        })
    }
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Registration numbers are stored and compared trimmed and upper-cased.
pub fn normalize_registration_number(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Result of a name or registration-number search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub businesses: Vec<Business>,
    /// Number of businesses returned, not the number that matched.
    pub total: i64,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessPage {
    pub businesses: Vec<Business>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationStats {
    pub total: i64,
    pub verified: i64,
    pub unverified: i64,
}
