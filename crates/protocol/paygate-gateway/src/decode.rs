//! Typed decoding of gateway response bodies.
//!
//! Every gateway body carries a success/error acknowledgement. These helpers
//! check it before decoding, so a `success: false` body surfaces as
//! [`GatewayError::Rejected`] rather than as a half-filled result.

use paygate_types::Acknowledgement;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{GatewayError, GatewayResult};

/// Decode a body into `T` without inspecting the acknowledgement.
pub fn decode<T: DeserializeOwned>(value: Value) -> GatewayResult<T> {
    serde_json::from_value(value).map_err(|e| GatewayError::decode(e.to_string()))
}

/// Read the acknowledgement core of a body.
pub fn acknowledgement(value: &Value) -> GatewayResult<Acknowledgement> {
    Acknowledgement::deserialize(value)
        .map_err(|e| GatewayError::decode(format!("missing acknowledgement: {}", e)))
}

/// Fail with [`GatewayError::Rejected`] unless the body reports success.
pub fn check_acknowledgement(value: &Value) -> GatewayResult<Acknowledgement> {
    let ack = acknowledgement(value)?;
    if ack.success {
        Ok(ack)
    } else {
        Err(GatewayError::rejected(ack.reason(), value.clone()))
    }
}

/// Check the acknowledgement, then decode the full body into `T`.
pub fn decode_acknowledged<T: DeserializeOwned>(value: Value) -> GatewayResult<T> {
    check_acknowledgement(&value)?;
    decode(value)
}
