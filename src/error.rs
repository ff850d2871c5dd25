use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharesubError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown account: #{0}")]
    AccountNotFound(u64),

    #[error("Unknown subscription: #{subscription} (account #{account})")]
    SubscriptionNotFound { account: u64, subscription: u64 },

    #[error("Unknown member: #{member} (account #{account}, subscription #{subscription})")]
    MemberNotFound {
        account: u64,
        subscription: u64,
        member: u64,
    },

    #[error("Unknown email: #{0}")]
    EmailNotFound(u64),

    #[error("Invalid import: {0}")]
    InvalidImport(String),

    #[error("Form does not match its target: {0}")]
    FormMismatch(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SharesubError>;
