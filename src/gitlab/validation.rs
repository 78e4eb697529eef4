//! Shape checks applied to raw GitLab responses.
//!
//! A [`ShapeCheck`] only confirms that one expected key is present before the
//! payload is decoded. The key is configurable per call site through
//! [`ValidationPolicy`].

use serde_json::Value;

use super::error::ClientError;

/// Accepts a response when it is a JSON object carrying a non-null
/// `required_field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeCheck {
    required_field: String,
    failure_message: String,
}

impl ShapeCheck {
    /// Builds a check requiring `field`, failing with `message`.
    #[must_use]
    pub fn requiring(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            required_field: field.into(),
            failure_message: message.into(),
        }
    }

    /// Returns a copy of this check that requires `field` instead, keeping
    /// the failure message.
    #[must_use]
    pub fn with_required_field(&self, field: impl Into<String>) -> Self {
        Self {
            required_field: field.into(),
            failure_message: self.failure_message.clone(),
        }
    }

    /// Key that must be present.
    #[must_use]
    pub fn required_field(&self) -> &str {
        &self.required_field
    }

    /// Message reported when the key is absent.
    #[must_use]
    pub fn failure_message(&self) -> &str {
        &self.failure_message
    }

    /// Passes `raw` through when the required key is present.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` carrying the failure message when
    /// `raw` is not an object or the key is absent or null.
    pub fn check(&self, raw: Value) -> Result<Value, ClientError> {
        let present = raw
            .as_object()
            .and_then(|object| object.get(&self.required_field))
            .is_some_and(|value| !value.is_null());

        if present {
            Ok(raw)
        } else {
            Err(ClientError::Validation {
                message: self.failure_message.clone(),
            })
        }
    }
}

/// One shape check per call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Applied to the current user profile.
    pub user: ShapeCheck,
    /// Applied to merge request metadata.
    pub merge_request: ShapeCheck,
    /// Applied to the merge request change list.
    pub changes: ShapeCheck,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            user: ShapeCheck::requiring("id", "Invalid user profile"),
            merge_request: ShapeCheck::requiring("iid", "Invalid merge request"),
            changes: ShapeCheck::requiring("changes", "Invalid merge request changes"),
        }
    }
}
