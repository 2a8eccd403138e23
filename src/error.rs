// src/error.rs
use std::fmt;

/// Every failure the app can report to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    ConfigurationMissing(String),
    ImageDecodeFailure(String),
    UnsupportedFormat(String),
    Timeout,
    ConnectionFailure(String),
    HttpError { status: u16, body: String },
    NetworkError(String),
    MalformedResponse(String),
    Busy,
    NoImageSelected,
    Export(String),
}

impl AppError {
    /// Short stable label, used in logs and the diagnostic panel
    pub fn category(&self) -> &'static str {
        match self {
            AppError::ConfigurationMissing(_) => "configuration",
            AppError::ImageDecodeFailure(_) => "image-decode",
            AppError::UnsupportedFormat(_) => "unsupported-format",
            AppError::Timeout => "timeout",
            AppError::ConnectionFailure(_) => "connection",
            AppError::HttpError { .. } => "http",
            AppError::NetworkError(_) => "network",
            AppError::MalformedResponse(_) => "malformed-response",
            AppError::Busy => "busy",
            AppError::NoImageSelected => "no-image",
            AppError::Export(_) => "export",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::ConfigurationMissing(_))
    }

    /// Transport failures leave the selected image in place for another attempt
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::Timeout
                | AppError::ConnectionFailure(_)
                | AppError::HttpError { .. }
                | AppError::NetworkError(_)
                | AppError::MalformedResponse(_)
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ConfigurationMissing(detail) => {
                write!(f, "Configuration error: {}", detail)
            }
            AppError::ImageDecodeFailure(detail) => {
                write!(f, "Could not load the image: {}", detail)
            }
            AppError::UnsupportedFormat(ext) => write!(
                f,
                "Unsupported file type '{}'. Supported formats: PNG, JPG, JPEG",
                ext
            ),
            AppError::Timeout => write!(
                f,
                "Timeout: the server did not respond in time. Please try again later."
            ),
            AppError::ConnectionFailure(detail) => write!(
                f,
                "Connection error: the webhook URL is not reachable ({})",
                detail
            ),
            AppError::HttpError { status, body } => {
                write!(f, "Processing failed (status {}): {}", status, body)
            }
            AppError::NetworkError(detail) => write!(f, "Network error: {}", detail),
            AppError::MalformedResponse(detail) => {
                write!(f, "The server response is not valid JSON: {}", detail)
            }
            AppError::Busy => write!(f, "A request is already being processed"),
            AppError::NoImageSelected => write!(f, "Please select an image first"),
            AppError::Export(detail) => write!(f, "Could not save the result: {}", detail),
        }
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_have_distinct_messages() {
        let errors = [
            AppError::Timeout,
            AppError::ConnectionFailure("refused".into()),
            AppError::HttpError { status: 500, body: "boom".into() },
            AppError::NetworkError("reset".into()),
        ];
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
        let categories: Vec<&str> = errors.iter().map(|e| e.category()).collect();
        assert_eq!(categories, ["timeout", "connection", "http", "network"]);
    }

    #[test]
    fn http_error_surfaces_status_and_body() {
        let err = AppError::HttpError { status: 404, body: "not here".into() };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("not here"));
    }

    #[test]
    fn only_configuration_is_fatal() {
        assert!(AppError::ConfigurationMissing("x".into()).is_fatal());
        assert!(!AppError::Timeout.is_fatal());
        assert!(!AppError::ImageDecodeFailure("x".into()).is_fatal());
        assert!(AppError::MalformedResponse("x".into()).is_transport());
        assert!(!AppError::Busy.is_transport());
    }
}
