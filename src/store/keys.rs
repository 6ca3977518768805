//! Persisted key space.

/// `"true"` once the tutorial has been finished or skipped.
pub const ONBOARDING_COMPLETED: &str = "onboardingCompleted";
/// `"true"` once the welcome screen has been passed.
pub const ONBOARDING_STARTED: &str = "onboardingStarted";
/// `"admin"` | `"driver"`.
pub const USER_PROFILE: &str = "userProfile";
pub const IS_LOGGED_IN: &str = "isLoggedIn";
/// Opaque session token issued by the auth gateway.
pub const TOKEN: &str = "token";
pub const USER_TYPE: &str = "userType";
pub const USER_ID: &str = "userId";
pub const USER_NAME: &str = "userName";
pub const USER_EMAIL: &str = "userEmail";
/// `"light"` | `"dark"` | `"highContrast"`.
pub const THEME_TYPE: &str = "theme_type";
/// JSON-encoded partial palette.
pub const CUSTOM_COLORS: &str = "custom_colors";

/// Value stored under boolean flags. Anything else reads as false.
pub const TRUE_SENTINEL: &str = "true";

/// Keys cleared on sign-out.
pub const SESSION_KEYS: &[&str] = &[
    IS_LOGGED_IN,
    TOKEN,
    USER_TYPE,
    USER_ID,
    USER_NAME,
    USER_EMAIL,
    USER_PROFILE,
];

/// Whether a raw stored flag value means "set".
pub fn is_true(value: Option<&str>) -> bool {
    value == Some(TRUE_SENTINEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_sentinel_is_truthy() {
        assert!(is_true(Some("true")));
        assert!(!is_true(Some("TRUE")));
        assert!(!is_true(Some("1")));
        assert!(!is_true(Some("")));
        assert!(!is_true(None));
    }

    #[test]
    fn sign_out_keys_leave_onboarding_and_theme_alone() {
        for key in [ONBOARDING_COMPLETED, ONBOARDING_STARTED, THEME_TYPE, CUSTOM_COLORS] {
            assert!(!SESSION_KEYS.contains(&key), "{key} must survive sign-out");
        }
    }
}
