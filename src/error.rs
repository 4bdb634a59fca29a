/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    ExternalApi(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message shown to the user when a fetch fails
    ///
    /// Transport failures keep their reqwest detail, non-2xx responses read as
    /// `"recommend failed: 502 Bad Gateway"`.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_api_message_is_unprefixed() {
        let err = AppError::ExternalApi("recommend failed: 500".to_string());
        assert_eq!(err.user_message(), "recommend failed: 500");
    }

    #[test]
    fn test_invalid_input_message() {
        let err = AppError::InvalidInput("mood text cannot be empty".to_string());
        assert_eq!(err.to_string(), "Invalid input: mood text cannot be empty");
    }
}
