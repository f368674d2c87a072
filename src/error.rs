use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type ConfigError = Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Cache retrieval failed: {0}")]
    Retrieval(String),

    #[error("Cache insertion failed: {0}")]
    Insertion(String),

    #[error("Cache deletion failed: {0}")]
    Deletion(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    pub fn is_temporary(&self) -> bool {
        matches!(
            self,
            Error::Connectivity(_) | Error::Io(_) | Error::StoreUnavailable(_)
        )
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidUrl(_) | Error::Config(_) | Error::NotFound(_)
        )
    }

    /// True for the three failure kinds a `FeedStore` reports.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            Error::Retrieval(_) | Error::Insertion(_) | Error::Deletion(_)
        )
    }

    /// Suggested next step for the CLI user, if there is an obvious one.
    pub fn hint(&self) -> Option<&'static str> {
        if self.is_store_error() {
            Some("run `feed-cache validate` to discard an unreadable cache")
        } else if self.is_temporary() {
            Some("this may be temporary; try again")
        } else if self.is_user_error() {
            Some("check the configuration file or run `feed-cache init`")
        } else {
            None
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Connectivity(_) => "CONNECTIVITY",
            Error::InvalidData(_) => "INVALID_DATA",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::Retrieval(_) => "RETRIEVAL",
            Error::Insertion(_) => "INSERTION",
            Error::Deletion(_) => "DELETION",
            Error::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Error::Io(_) => "IO_ERROR",
            Error::Database(_) => "DATABASE",
            Error::Config(_) => "CONFIG",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Invalid(_) => "INVALID",
        }
    }
}
