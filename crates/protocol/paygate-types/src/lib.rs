//! Data structures for the Paygate client SDK.
//!
//! This crate holds the types shared by the signer, transport, router and
//! client facade. It contains no I/O.
//!
//! # Module Organization
//!
//! - [`credentials`] - API credential triple
//! - [`route`] - Terminal route records
//! - [`transaction`] - Transaction request/response models
//! - [`payment`] - Explicit payment method classification
//! - [`error`] - Error codes shared across crates
//! - [`constants`] - Header names, paths and defaults
//!
//! # Example
//!
//! ```
//! use paygate_types::{PaymentMethod, TransactionRequest};
//!
//! let request = TransactionRequest::for_terminal("Front Counter", "12.50");
//! assert_eq!(
//!     request.payment_method(),
//!     PaymentMethod::Terminal { name: "Front Counter".into() }
//! );
//! ```

/// SDK version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod constants;
pub mod credentials;
pub mod error;
pub mod payment;
pub mod route;
pub mod transaction;

pub use credentials::Credentials;
pub use error::ErrorCode;
pub use payment::PaymentMethod;
pub use route::RouteRecord;
pub use transaction::{Acknowledgement, TransactionRequest, TransactionResponse};
