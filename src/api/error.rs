use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Server-reported domain error with a stable detail code
    /// (e.g. LOGIN_BAD_CREDENTIALS)
    #[error("{detail}")]
    Api { detail: String },

    /// Field-level validation failure reported by the server (HTTP 422)
    #[error("{message}")]
    Validation { message: String },

    #[error("Unauthorized - token is missing or no longer accepted")]
    Unauthorized,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            // Back off to a char boundary so multi-byte text can't split
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..end],
                body.len()
            )
        }
    }

    /// Classify a failed response.
    ///
    /// The server reports errors as `{"detail": "CODE"}` for domain errors
    /// and `{"detail": [{"msg": ...}, ...]}` for request validation errors.
    pub fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        if status.as_u16() == 401 {
            return ApiError::Unauthorized;
        }

        #[derive(serde::Deserialize)]
        struct ErrorBody {
            detail: serde_json::Value,
        }

        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
            match parsed.detail {
                serde_json::Value::String(detail) => return ApiError::Api { detail },
                serde_json::Value::Array(items) => {
                    if let Some(msg) = items
                        .first()
                        .and_then(|item| item.get("msg"))
                        .and_then(|msg| msg.as_str())
                    {
                        return ApiError::Validation {
                            message: msg.to_string(),
                        };
                    }
                }
                _ => {}
            }
        }

        ApiError::InvalidResponse(format!("Status {}: {}", status, Self::truncate_body(body)))
    }
}
