//! Signed identity token handed to the browser.

// self
use crate::_prelude::*;

/// Opaque bearer token minted by a [`TokenCodec`](crate::codec::TokenCodec).
///
/// The value is only ever exposed when it is written into the identity cookie.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityToken {
	value: String,
	/// Instant the token stops verifying.
	pub expires_at: OffsetDateTime,
}
impl IdentityToken {
	/// Wraps an encoded token together with its expiry.
	pub fn new(value: impl Into<String>, expires_at: OffsetDateTime) -> Self {
		Self { value: value.into(), expires_at }
	}

	/// Returns the encoded token. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.value
	}

	/// Consumes the wrapper, returning the encoded token.
	pub fn into_inner(self) -> String {
		self.value
	}
}
impl Debug for IdentityToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IdentityToken")
			.field("value", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
