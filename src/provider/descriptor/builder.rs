// std
use std::iter::IntoIterator;
// self
use crate::{
	_prelude::*,
	auth::StrategyType,
	provider::{ClientAuthMethod, ProviderDescriptor, ProviderEndpoints, ProviderQuirks},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderDescriptorError {
	/// Authorization endpoint is required.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is required.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Profile endpoint is required.
	#[error("Missing profile endpoint.")]
	MissingProfileEndpoint,
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Reject scope delimiters that are control characters.
	#[error("Scope delimiter must be a printable character.")]
	InvalidScopeDelimiter {
		/// Invalid delimiter that was supplied.
		delimiter: char,
	},
	/// Scopes must be non-empty and free of whitespace.
	#[error("Scope `{scope}` is invalid.")]
	InvalidScope {
		/// Offending scope value.
		scope: String,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: StrategyType,
	/// Authorization endpoint.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint used for the code exchange.
	pub token_endpoint: Option<Url>,
	/// Profile endpoint queried with the access token.
	pub profile_endpoint: Option<Url>,
	/// Requested scopes, in order.
	pub scopes: Vec<String>,
	/// Preferred client authentication method for the token endpoint.
	pub preferred_client_auth_method: ClientAuthMethod,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: StrategyType) -> Self {
		Self {
			id,
			authorization_endpoint: None,
			token_endpoint: None,
			profile_endpoint: None,
			scopes: Vec::new(),
			preferred_client_auth_method: ClientAuthMethod::default(),
			quirks: ProviderQuirks::default(),
		}
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the profile endpoint.
	pub fn profile_endpoint(mut self, url: Url) -> Self {
		self.profile_endpoint = Some(url);

		self
	}

	/// Appends requested scopes.
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes.extend(scopes.into_iter().map(Into::into));

		self
	}

	/// Overrides the preferred client authentication method.
	pub fn preferred_client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.preferred_client_auth_method = method;

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let authorization = self
			.authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingAuthorizationEndpoint)?;
		let token = self.token_endpoint.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?;
		let profile = self.profile_endpoint.ok_or(ProviderDescriptorError::MissingProfileEndpoint)?;
		let descriptor = ProviderDescriptor {
			id: self.id,
			endpoints: ProviderEndpoints { authorization, token, profile },
			scopes: self.scopes,
			preferred_client_auth_method: self.preferred_client_auth_method,
			quirks: self.quirks,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		validate_endpoint("authorization", &self.endpoints.authorization)?;
		validate_endpoint("token", &self.endpoints.token)?;
		validate_endpoint("profile", &self.endpoints.profile)?;
		validate_scope_delimiter(self.quirks.scope_delimiter)?;

		if let Some(scope) =
			self.scopes.iter().find(|scope| scope.is_empty() || scope.contains(char::is_whitespace))
		{
			return Err(ProviderDescriptorError::InvalidScope { scope: scope.clone() });
		}

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.scheme() != "https" {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}

fn validate_scope_delimiter(delimiter: char) -> Result<(), ProviderDescriptorError> {
	if delimiter.is_control() {
		Err(ProviderDescriptorError::InvalidScopeDelimiter { delimiter })
	} else {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Test URL should parse.")
	}

	fn builder() -> ProviderDescriptorBuilder {
		ProviderDescriptor::builder(StrategyType::new("mock").expect("Strategy type should be valid."))
			.authorization_endpoint(url("https://id.example.com/authorize"))
			.token_endpoint(url("https://id.example.com/token"))
			.profile_endpoint(url("https://api.example.com/me"))
	}

	#[test]
	fn complete_descriptor_builds_and_joins_scopes() {
		let descriptor = builder()
			.scopes(["email", "public_profile"])
			.quirks(ProviderQuirks { scope_delimiter: ',', ..Default::default() })
			.build()
			.expect("Descriptor should build.");

		assert_eq!(descriptor.scope_param().as_deref(), Some("email,public_profile"));
		assert_eq!(descriptor.preferred_client_auth_method, ClientAuthMethod::ClientSecretBasic);
		assert!(descriptor.quirks.pkce_supported);
	}

	#[test]
	fn empty_scope_list_omits_the_parameter() {
		let descriptor = builder().build().expect("Descriptor should build.");

		assert_eq!(descriptor.scope_param(), None);
	}

	#[test]
	fn plain_http_endpoints_are_rejected() {
		let err = builder()
			.profile_endpoint(url("http://api.example.com/me"))
			.build()
			.expect_err("Plain HTTP must be rejected.");

		assert_eq!(err, ProviderDescriptorError::InsecureEndpoint {
			endpoint: "profile",
			url: "http://api.example.com/me".into(),
		});
	}

	#[test]
	fn missing_endpoints_and_bad_scopes_are_rejected() {
		let err = ProviderDescriptor::builder(
			StrategyType::new("mock").expect("Strategy type should be valid."),
		)
		.authorization_endpoint(url("https://id.example.com/authorize"))
		.build()
		.expect_err("Token endpoint is required.");

		assert_eq!(err, ProviderDescriptorError::MissingTokenEndpoint);

		let err = builder().scopes(["read user"]).build().expect_err("Whitespace is not allowed.");

		assert_eq!(err, ProviderDescriptorError::InvalidScope { scope: "read user".into() });

		let err = builder()
			.quirks(ProviderQuirks { scope_delimiter: '\n', ..Default::default() })
			.build()
			.expect_err("Control delimiters are not allowed.");

		assert_eq!(err, ProviderDescriptorError::InvalidScopeDelimiter { delimiter: '\n' });
	}
}
