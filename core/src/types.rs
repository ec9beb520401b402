//! Shared primitive types used across the analytics engine.

/// Identifier of a user, as carried by the action log.
pub type UserId = i64;

/// Identifier of a single action record.
pub type ActionId = i64;

/// Action type that links a referrer to a referred user.
pub const REFERRAL_ACTION_TYPE: &str = "REFER_USER";
