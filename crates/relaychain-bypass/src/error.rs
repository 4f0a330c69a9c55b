//! Error types for bypass rule sets.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BypassError {
    #[error("bypass '{bypass}': empty matcher")]
    EmptyMatcher { bypass: String },

    #[error("bypass '{bypass}': invalid CIDR '{matcher}'")]
    InvalidCidr { bypass: String, matcher: String },

    #[error("bypass '{bypass}': invalid keyword matcher '{matcher}'")]
    InvalidKeyword { bypass: String, matcher: String },
}
