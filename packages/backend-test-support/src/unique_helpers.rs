//! ULID-backed generators so concurrently running tests never share identities.

use ulid::Ulid;

/// `{prefix}-{ulid}`
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// A fresh guest id, as a client would send in `X-Guest-Id`.
///
/// ```
/// use tycoon_test_support::unique_helpers::unique_guest_id;
///
/// let a = unique_guest_id();
/// let b = unique_guest_id();
/// assert_ne!(a, b);
/// assert!(a.starts_with("guest-"));
/// ```
pub fn unique_guest_id() -> String {
    unique_str("guest")
}

/// A fresh registered-user id, as a client would send in `X-User-Id`.
pub fn unique_user_id() -> String {
    unique_str("user")
}
