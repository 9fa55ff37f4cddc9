//! Provider descriptor data structures shared by every OAuth 2.0 strategy.
//!
//! A descriptor is plain, validated metadata: HTTPS-only endpoints, requested scopes, the client
//! authentication preference, and provider quirks. Behavior lives in the strategy that owns it.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use quirks::*;

// self
use crate::{_prelude::*, auth::StrategyType};

/// Preferred client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint the browser is redirected to.
	pub authorization: Url,
	/// Token endpoint used for the authorization-code exchange.
	pub token: Url,
	/// Endpoint returning the signed-in user's profile for a bearer access token.
	pub profile: Url,
}

/// Immutable provider descriptor consumed by [`OAuthStrategy`](crate::provider::OAuthStrategy).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Strategy type the provider is mounted under.
	pub id: StrategyType,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Scopes requested on the authorization redirect.
	pub scopes: Vec<String>,
	/// Preferred client authentication mechanism.
	pub preferred_client_auth_method: ClientAuthMethod,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: StrategyType) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}

	/// Joins the requested scopes with the provider's delimiter.
	///
	/// Returns `None` when no scopes are requested.
	pub fn scope_param(&self) -> Option<String> {
		if self.scopes.is_empty() {
			return None;
		}

		let mut buf = [0; 4];
		let delimiter = self.quirks.scope_delimiter.encode_utf8(&mut buf);

		Some(self.scopes.join(delimiter))
	}
}
