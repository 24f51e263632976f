//! Legality checks performed before any mutation.
//!
//! Requirement checks collect every failure so callers can show complete
//! feedback; payment checks stop at the first problem.
mod payment;
mod requirements;

pub use payment::{CardPayment, PaymentError};
pub use requirements::{RequirementError, TagCounts, validate_requirements};
