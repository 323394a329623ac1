use roster_core::UserId;

/// Failures a store operation can surface. The display string is the
/// message reported to the caller verbatim.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("User with ID {0} not found")]
    NotFound(UserId),

    #[error("{0}")]
    InvalidArgument(String),
}
