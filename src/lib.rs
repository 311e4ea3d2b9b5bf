//! relief-node: disaster-relief logistics coordinator
//!
//! Field actors submit aid requests tied to coordinates; the service assigns
//! each request to the nearest administrative district, tracks per-district
//! inventory, resolves requests by deducting inventory, transfers inventory
//! between districts, and escalates the priority of unresolved requests on a
//! fixed timer.
//!
//! ## Modules
//!
//! - **geo**: great-circle nearest-district lookup
//! - **store**: SQLite-backed districts, inventory ledger, requests,
//!   credentials
//! - **lifecycle**: request intake and transactional resolution
//! - **escalator**: recurring priority escalation task
//! - **auth**: Argon2 password hashing, JWT issue/validate/revoke
//! - **api**: axum HTTP surface

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod escalator;
pub mod geo;
pub mod lifecycle;
pub mod seed;
pub mod store;

pub use config::Config;
pub use error::{ReliefError, Result};
