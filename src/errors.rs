use axum::http::StatusCode;
use axum::response::IntoResponse;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::Llm(LlmError::Disabled) => {
                (StatusCode::SERVICE_UNAVAILABLE, "LLM features are disabled").into_response()
            }
            AppError::Llm(e) => (StatusCode::BAD_GATEWAY, e.to_string()).into_response(),
        }
    }
}

/// Failure reported by a market data or news provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("no data found")]
    NotFound,

    #[error("rate limited")]
    RateLimited,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Failure while generating narrative text.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM features are disabled")]
    Disabled,

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("rate limited by LLM provider")]
    RateLimited,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Numeric failure inside the risk classifier.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ComputationError {
    #[error("at least {required} price points are needed, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("close price on {date} is {value}, cannot compute a return from it")]
    InvalidClose { date: chrono::NaiveDate, value: f64 },

    #[error("volatility is not a finite number")]
    NonFiniteVolatility,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(status(AppError::Validation("empty query".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(AppError::NotFound("session".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(AppError::Llm(LlmError::Disabled)), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            status(AppError::Llm(LlmError::ApiError("upstream 500".into()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(status(LlmError::Timeout.into()), StatusCode::BAD_GATEWAY);
    }
}
