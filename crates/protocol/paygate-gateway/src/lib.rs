//! Signed HTTP transport for the Paygate gateway API.
//!
//! Every call is signed with [`paygate_auth`], sent as JSON to
//! `{scheme}://{host}/api{path}`, and decoded back into a JSON value.
//! Failures keep the distinctions callers act on:
//!
//! | Failure | Error |
//! |---------|-------|
//! | DNS, connection refused, timeout | [`GatewayError::Network`] |
//! | `success: false` in the body | [`GatewayError::Rejected`] |
//! | Non-2xx without an acknowledgement | [`GatewayError::Http`] |
//! | Body does not match the expected shape | [`GatewayError::Decode`] |
//! | Malformed signing key | [`GatewayError::Auth`] |
//!
//! No call is retried here.
//!
//! # Example
//!
//! ```rust,no_run
//! use paygate_gateway::{decode_acknowledged, GatewayConfig, GatewayTransport, HttpGateway};
//! use paygate_types::{Credentials, TransactionResponse};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::new(Credentials::new("key", "bearer", "aa".repeat(32)));
//! let gateway = HttpGateway::new(config)?;
//!
//! let body = gateway
//!     .post("/charge", json!({"token": "tok_1", "amount": "5.00"}), true)
//!     .await?;
//! let _response: TransactionResponse = decode_acknowledged(body)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod transport;

pub use config::GatewayConfig;
pub use decode::{check_acknowledgement, decode, decode_acknowledged};
pub use error::{GatewayError, GatewayResult};
pub use transport::{GatewayTransport, HttpGateway};
