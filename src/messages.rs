//! Mapping of API failures to user-facing notification copy.
//!
//! Every failure a user can trigger collapses into a closed vocabulary
//! of messages. Raw transport errors, status lines and unknown codes
//! never reach the user; they fall back to a generic message.

use crate::api::ApiError;

/// Fallback for anything without a known mapping
pub const GENERIC_ERROR: &str = "Something went wrong.";

/// Messages for the server's stable error codes
fn known_message(code: &str) -> Option<&'static str> {
    match code {
        "REGISTER_USER_ALREADY_EXISTS" => {
            Some("An account with this email already exists. Please sign in instead.")
        }
        "LOGIN_BAD_CREDENTIALS" => Some("Invalid email or password. Please try again."),
        "LOGIN_INACTIVE_USER" => Some(
            "Your account has been deactivated. Please contact support if you believe this is an error.",
        ),
        "LOGIN_USER_NOT_VERIFIED" => Some(
            "Please verify your email address before signing in. If you have not received a verification email, please check your spam folder or request a new verification email.",
        ),
        _ => None,
    }
}

/// Heuristic for field-level validation text that is safe to show verbatim
fn looks_like_validation(message: &str) -> bool {
    message.contains("validation") || message.contains("field")
}

/// Convert an API failure into the single user-facing message for it.
pub fn user_message(error: &ApiError) -> String {
    match error {
        ApiError::Api { detail } => {
            if let Some(mapped) = known_message(detail) {
                mapped.to_string()
            } else if looks_like_validation(detail) {
                detail.clone()
            } else {
                GENERIC_ERROR.to_string()
            }
        }
        ApiError::Validation { message } => {
            if looks_like_validation(message) {
                message.clone()
            } else {
                GENERIC_ERROR.to_string()
            }
        }
        _ => GENERIC_ERROR.to_string(),
    }
}
