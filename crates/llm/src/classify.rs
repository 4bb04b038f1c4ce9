//! Provider error classification
//!
//! The provider signals an unknown or retired model only through free text,
//! so the retry decision rests on substring matching. Keep every rule here:
//! if the provider rewords its errors, this is the one place to update.

use chatdigest_common::ChatdigestError;

/// True when `message` reads like a "model not found" failure.
pub fn is_model_not_found_message(message: &str) -> bool {
    if message.contains("404") || message.contains("NOT_FOUND") || message.contains("is not found") {
        return true;
    }

    let lower = message.to_lowercase();
    lower.contains("model") && lower.contains("not found")
}

/// True when `err` should trigger a fallback to the next candidate model.
pub fn is_model_not_found(err: &ChatdigestError) -> bool {
    match err {
        ChatdigestError::ModelNotFound { .. } => true,
        ChatdigestError::MissingCredential(_) | ChatdigestError::NoModelsAvailable => false,
        other => is_model_not_found_message(&other.to_string()),
    }
}
