//! Business logic layer
//!
//! Services wrap the record store and the QR encoder. Each call is a single
//! independent operation; failures are surfaced as one error per operation.

pub mod qr;
pub mod search;
pub mod verification;

pub use qr::{is_valid_id, QrFormat, QrImage, QrService};
pub use search::SearchService;
pub use verification::VerificationService;
