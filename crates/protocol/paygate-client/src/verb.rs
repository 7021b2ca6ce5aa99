//! Transaction verbs.

use std::fmt;

/// A gateway transaction operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Verb {
    Charge,
    Preauth,
    Refund,
    Void,
    Capture,
    Reverse,
    Enroll,
    CloseBatch,
}

impl Verb {
    /// Every verb, in declaration order.
    pub const ALL: [Verb; 8] = [
        Verb::Charge,
        Verb::Preauth,
        Verb::Refund,
        Verb::Void,
        Verb::Capture,
        Verb::Reverse,
        Verb::Enroll,
        Verb::CloseBatch,
    ];

    /// Wire name, e.g. `close-batch`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Charge => "charge",
            Verb::Preauth => "preauth",
            Verb::Refund => "refund",
            Verb::Void => "void",
            Verb::Capture => "capture",
            Verb::Reverse => "reverse",
            Verb::Enroll => "enroll",
            Verb::CloseBatch => "close-batch",
        }
    }

    /// Gateway path for a gateway-direct call, e.g. `/charge`.
    pub fn path(&self) -> String {
        format!("/{}", self.as_str())
    }

    /// Gateway path for a cloud-relayed terminal call, e.g. `/terminal-charge`.
    pub fn relay_path(&self) -> String {
        format!("/terminal-{}", self.as_str())
    }

    /// Returns true if the verb has an asynchronous, terminal-only variant.
    pub fn supports_async(&self) -> bool {
        matches!(
            self,
            Verb::Charge | Verb::Preauth | Verb::Refund | Verb::Enroll
        )
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
