// self
use crate::_prelude::*;

/// Provider-specific quirks that influence how strategies talk to a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Whether the provider accepts PKCE parameters on authorize and token requests.
	pub pkce_supported: bool,
	/// Character used to join scopes when constructing `scope` parameters.
	pub scope_delimiter: char,
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self { pkce_supported: true, scope_delimiter: ' ' }
	}
}
