//! Payment method classification.
//!
//! A request names its payment method implicitly, through whichever optional
//! fields are non-empty. [`PaymentMethod`] makes that explicit once, at the
//! boundary, so routing and validation match on a single value.

use crate::transaction::TransactionRequest;

/// How a transaction's payment method is supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Only a terminal name is present; the terminal collects the card.
    Terminal { name: String },

    /// An enrolled token.
    Token { token: String },

    /// Swiped magnetic stripe data.
    Track { track1: String, track2: String },

    /// A primary account number with expiry.
    Pan {
        pan: String,
        expiry_month: String,
        expiry_year: String,
    },

    /// No payment method, e.g. void or capture by transaction id.
    Unspecified,
}

impl PaymentMethod {
    /// Classify a request.
    ///
    /// Any token, track, or PAN field takes precedence over a terminal name:
    /// a request is terminal-directed only when the terminal name is its sole
    /// payment field.
    pub fn from_request(request: &TransactionRequest) -> Self {
        if !request.token.is_empty() {
            Self::Token {
                token: request.token.clone(),
            }
        } else if !request.track1.is_empty() || !request.track2.is_empty() {
            Self::Track {
                track1: request.track1.clone(),
                track2: request.track2.clone(),
            }
        } else if !request.pan.is_empty() {
            Self::Pan {
                pan: request.pan.clone(),
                expiry_month: request.expiry_month.clone(),
                expiry_year: request.expiry_year.clone(),
            }
        } else if !request.terminal_name.is_empty() {
            Self::Terminal {
                name: request.terminal_name.clone(),
            }
        } else {
            Self::Unspecified
        }
    }

    /// Returns true if the terminal collects the payment method.
    pub fn is_terminal_directed(&self) -> bool {
        matches!(self, Self::Terminal { .. })
    }

    /// The terminal name, for terminal-directed methods.
    pub fn terminal_name(&self) -> Option<&str> {
        match self {
            Self::Terminal { name } => Some(name),
            _ => None,
        }
    }

    /// Short label used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Terminal { .. } => "terminal",
            Self::Token { .. } => "token",
            Self::Track { .. } => "track",
            Self::Pan { .. } => "pan",
            Self::Unspecified => "unspecified",
        }
    }
}
