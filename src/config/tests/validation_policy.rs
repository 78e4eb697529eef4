//! Tests for required-field overrides.

use rstest::rstest;

use crate::TanukiConfig;
use crate::gitlab::validation::ValidationPolicy;

#[rstest]
fn defaults_match_builtin_policy() {
    assert_eq!(
        TanukiConfig::default().validation_policy(),
        ValidationPolicy::default()
    );
}

#[rstest]
fn overrides_replace_required_fields_only() {
    let config = TanukiConfig {
        user_required_field: Some("username".to_owned()),
        changes_required_field: Some("  ".to_owned()),
        ..Default::default()
    };

    let policy = config.validation_policy();

    assert_eq!(policy.user.required_field(), "username");
    assert_eq!(policy.user.failure_message(), "Invalid user profile");
    assert_eq!(
        policy.changes.required_field(),
        "changes",
        "blank overrides are ignored"
    );
    assert_eq!(policy.merge_request.required_field(), "iid");
}
