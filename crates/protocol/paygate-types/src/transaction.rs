//! Transaction request and response models.
//!
//! Only the fields the client itself inspects are typed. Responses keep every
//! other field the gateway returns in [`TransactionResponse::extra`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::payment::PaymentMethod;

fn is_false(value: &bool) -> bool {
    !*value
}

/// A transaction request body.
///
/// Empty strings and `false` flags are omitted when serialized, so the
/// gateway never sees a zero value it could mistake for an explicit one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// Route gateway-direct calls to the test gateway.
    #[serde(default, skip_serializing_if = "is_false")]
    pub test: bool,

    /// Caller-assigned reference used for idempotence.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub transaction_ref: String,

    /// Gateway transaction id (void, capture, reverse).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub transaction_id: String,

    /// Amount as a decimal string, e.g. `"25.00"`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub amount: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub currency: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tip_amount: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tax_amount: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Name of the terminal that should collect the payment method.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub terminal_name: String,

    /// Previously enrolled payment token.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,

    /// Primary account number.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pan: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub expiry_month: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub expiry_year: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cvv: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub postal_code: String,

    /// Magnetic stripe track 1 data.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub track1: String,

    /// Magnetic stripe track 2 data.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub track2: String,

    /// Ask the terminal to prompt for keyed entry instead of a card read.
    #[serde(default, skip_serializing_if = "is_false")]
    pub manual_entry: bool,

    /// Enroll the payment method in the token vault.
    #[serde(default, skip_serializing_if = "is_false")]
    pub enroll: bool,

    /// Return as soon as the terminal accepts the request.
    #[serde(default, rename = "async", skip_serializing_if = "is_false")]
    pub run_async: bool,
}

impl TransactionRequest {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request collected by a named terminal.
    pub fn for_terminal(terminal_name: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            terminal_name: terminal_name.into(),
            amount: amount.into(),
            ..Default::default()
        }
    }

    /// Request against an enrolled token.
    pub fn for_token(token: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            amount: amount.into(),
            ..Default::default()
        }
    }

    /// Request referencing an earlier transaction (void, capture, reverse).
    pub fn for_transaction(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            ..Default::default()
        }
    }

    /// Mark as a test transaction.
    pub fn with_test(mut self, test: bool) -> Self {
        self.test = test;
        self
    }

    /// Set the caller reference.
    pub fn with_transaction_ref(mut self, transaction_ref: impl Into<String>) -> Self {
        self.transaction_ref = transaction_ref.into();
        self
    }

    /// The payment method this request carries.
    pub fn payment_method(&self) -> PaymentMethod {
        PaymentMethod::from_request(self)
    }
}

/// The success/error core every gateway response carries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgement {
    pub success: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub response_description: String,
}

impl Acknowledgement {
    /// Best available human-readable reason for a failed acknowledgement.
    pub fn reason(&self) -> &str {
        if !self.error.is_empty() {
            &self.error
        } else if !self.response_description.is_empty() {
            &self.response_description
        } else {
            "request failed"
        }
    }
}

/// A transaction response body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub response_description: String,

    #[serde(default)]
    pub approved: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub transaction_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub transaction_ref: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auth_code: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub masked_pan: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub authorized_amount: String,

    /// Verb-specific fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransactionResponse {
    /// The acknowledgement core of this response.
    pub fn acknowledgement(&self) -> Acknowledgement {
        Acknowledgement {
            success: self.success,
            error: self.error.clone(),
            response_description: self.response_description.clone(),
        }
    }
}
