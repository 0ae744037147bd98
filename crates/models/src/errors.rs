use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid user data")]
    InvalidUserData(#[source] serde_json::Error),
    #[error("invalid email")]
    InvalidEmail,
    #[error("could not marshal item")]
    Encode(#[source] serde_json::Error),
    #[error("failed to unmarshal record")]
    Decode(#[source] serde_json::Error),
}
