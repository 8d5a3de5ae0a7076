//! Errors raised while validating a policy or running forget

use snapkeep_core::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("keep-tag values must not be empty")]
    EmptyTag,

    #[error("unknown timezone '{0}' (expected 'utc' or 'local')")]
    UnknownTimezone(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ForgetError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid retention policy")]
    Policy(#[from] PolicyError),

    #[error("failed to write report")]
    Report(#[source] std::io::Error),
}
