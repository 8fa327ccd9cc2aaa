//! Payment lifecycle state machine.
//!
//! Payments move through a linear lifecycle: registered (`pending` /
//! `pending_verification`), then verified into `completed` or rejected,
//! and a completed payment can later be refunded. `rejected`,
//! `refunded`, and `failed` are terminal.
//!
//! # Modules
//!
//! - `types` - Payment status and transition actions
//! - `error` - Payment-specific error types
//! - `service` - Guarded state transitions

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::PaymentError;
pub use service::PaymentLifecycle;
pub use types::{PaymentAction, PaymentStatus};
