//! Action analytics engine.
//!
//! Two questions over an in-memory action log:
//!   1. Given an action type, which action does a user perform next,
//!      and with what probability? (`transition`)
//!   2. How many users did each user reach through referral chains?
//!      (`referral`)
//!
//! `analytics::ActionAnalytics` is the entry point. It reads actions through
//! `source::ActionSource`, implemented by `snapshot::ActionSnapshot` (JSON,
//! in memory) and `store::AnalyticsStore` (SQLite).

pub mod action;
pub mod analytics;
pub mod config;
pub mod error;
pub mod referral;
pub mod snapshot;
pub mod source;
pub mod store;
pub mod transition;
pub mod types;
pub mod users;
