//! Synthetic email addresses for sign-up scenarios.

use chrono::Utc;
use rand::Rng;
use tracing::debug;

/// Default local-part prefix.
pub const EMAIL_PREFIX: &str = "aqa";

const SUFFIX_LEN: usize = 6;
const SUFFIX_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `aqa-<UTC YYYYMMDDHHMMSS>-<6 random [0-9a-z]>@test.com`.
#[must_use]
pub fn generate_unique_email() -> String {
    generate_unique_email_with_prefix(EMAIL_PREFIX)
}

/// Same shape as [`generate_unique_email`] with a caller-chosen prefix.
///
/// The prefix is not validated.
#[must_use]
pub fn generate_unique_email_with_prefix(prefix: &str) -> String {
    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from(SUFFIX_CHARS[rng.gen_range(0..SUFFIX_CHARS.len())]))
        .collect();

    let email = format!("{prefix}-{timestamp}-{suffix}@test.com");
    debug!(%email, "generated email");
    email
}
