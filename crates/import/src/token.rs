//! Bearer token from the provider's OAuth exchange.

use std::fmt;

/// Opaque access token. Held only for one measurement fetch; never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ImportToken(String);

impl ImportToken {
    /// Wrap a raw token.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw bearer value, for the `Authorization` header only.
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ImportToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ImportToken(<redacted>)")
    }
}
