//! Paygate client SDK.
//!
//! The [`Client`] signs every gateway call, decides per request whether a
//! transaction goes straight to the gateway or to a named payment terminal,
//! and caches terminal routes so repeated point-of-sale transactions skip
//! route discovery.
//!
//! # Dispatch
//!
//! | Payment fields present | Path |
//! |------------------------|------|
//! | terminal name only | route resolved, then [`TerminalTransport`] |
//! | token, track data or PAN | `POST /api/<verb>` on the gateway |
//! | none (void/capture by id) | `POST /api/<verb>` on the gateway |
//!
//! The `async_*` variants accept terminal-only requests and reject anything
//! else before touching the network.
//!
//! # Example
//!
//! ```rust,no_run
//! use paygate_client::{Client, ClientConfig};
//! use paygate_types::TransactionRequest;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::load_default()?;
//! let client = Client::from_config(&config)?;
//!
//! let response = client
//!     .charge(&TransactionRequest::for_terminal("Front Counter", "25.00"))
//!     .await?;
//! println!("approved: {}", response.approved);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod terminal;
pub mod verb;

pub use client::{cancellable, Client, ClientBuilder};
pub use config::{default_config_path, ClientConfig};
pub use error::{ClientError, ClientResult};
pub use terminal::{RelayTerminalTransport, TerminalTransport};
pub use verb::Verb;
