//! Strategy contract every identity provider plugs in through.
//!
//! The dispatcher only ever sees `Arc<dyn Strategy>`: it asks a strategy for the authorization
//! redirect, hands it the callback parameters, and maps the returned provider profile into a
//! [`UserProfile`]. Error classification helpers keep to primitive data so strategies stay
//! independent of any HTTP client.

// crates.io
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{StrategyType, UserProfile},
	error::{MappingError, ProviderError, ProviderErrorKind},
	session::PendingLogin,
};

/// Boxed future returned by [`Strategy::exchange`].
pub type StrategyFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, ProviderError>> + 'a + Send>>;

/// One identity provider, mounted under `/{type}` and `/{type}/callback`.
pub trait Strategy
where
	Self: Send + Sync,
{
	/// Unique type, used as the URL path segment.
	fn strategy_type(&self) -> &StrategyType;

	/// Callback URL registered with the provider.
	fn callback_url(&self) -> &Url;

	/// Builds the provider authorization URL for a freshly recorded pending login.
	fn authorize_url(&self, pending: &PendingLogin) -> Url;

	/// Exchanges the callback parameters for the provider's raw profile.
	fn exchange<'a>(
		&'a self,
		pending: &'a PendingLogin,
		callback: &'a CallbackParams,
	) -> StrategyFuture<'a, ProviderProfile>;

	/// Maps the provider profile into the canonical user profile.
	fn to_user(&self, profile: &ProviderProfile) -> Result<UserProfile, MappingError>;

	/// Maps low-level HTTP/JSON errors into the gateway's provider error taxonomy.
	fn classify_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind {
		ctx.classify()
	}
}

/// Query parameters a provider appends to the callback redirect.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
	/// Authorization code.
	pub code: Option<String>,
	/// State nonce echoed back by the provider.
	pub state: Option<String>,
	/// OAuth error code when the request was not approved.
	pub error: Option<String>,
	/// Human-readable description accompanying `error`.
	pub error_description: Option<String>,
}

/// Raw profile document returned by a provider's profile endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderProfile(Value);
impl ProviderProfile {
	/// Wraps a JSON document.
	pub fn new(value: Value) -> Self {
		Self(value)
	}

	/// Borrows the underlying JSON document.
	pub fn as_value(&self) -> &Value {
		&self.0
	}

	/// Deserializes the document into a provider-specific shape, reporting the failing path.
	pub fn deserialize<T>(&self) -> Result<T, MappingError>
	where
		T: DeserializeOwned,
	{
		Ok(serde_path_to_error::deserialize(&self.0)?)
	}
}
impl From<Value> for ProviderProfile {
	fn from(value: Value) -> Self {
		Self(value)
	}
}

/// Context passed to strategies when classifying provider errors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// HTTP status code returned by the provider, when available.
	pub http_status: Option<u16>,
	/// Provider-supplied OAuth `error` field.
	pub oauth_error: Option<String>,
	/// Provider-supplied OAuth `error_description` field.
	pub error_description: Option<String>,
	/// Preview of the response body for non-JSON payloads.
	pub body_preview: Option<String>,
	/// Indicates whether the failure originated from the network/transport layer.
	pub network_error: bool,
}
impl ProviderErrorContext {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Convenience constructor for transport-level/network failures.
	pub fn network_failure() -> Self {
		Self { network_error: true, ..Default::default() }
	}

	/// Adds an HTTP status code (e.g., 400, 401, 500).
	pub fn with_http_status(mut self, status: Option<u16>) -> Self {
		self.http_status = status;

		self
	}

	/// Adds the OAuth error code string returned by the provider.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Adds the OAuth `error_description` field.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}

	/// Adds a body preview for providers that return non-JSON payloads.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into()));

		self
	}

	/// Applies RFC-guided heuristics.
	///
	/// Structured OAuth fields win, then body text hints, then the HTTP status. Network
	/// failures are always transient.
	pub fn classify(&self) -> ProviderErrorKind {
		if self.network_error {
			return ProviderErrorKind::Transient;
		}

		if let Some(kind) =
			classify_oauth_error(self.oauth_error.as_deref(), self.error_description.as_deref())
		{
			return kind;
		}
		if let Some(kind) = classify_body(self.body_preview.as_deref()) {
			return kind;
		}

		classify_status(self.http_status)
	}
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= ProviderErrorContext::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = body.chars().take(ProviderErrorContext::BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

fn classify_oauth_error(
	oauth_error: Option<&str>,
	error_description: Option<&str>,
) -> Option<ProviderErrorKind> {
	oauth_error
		.and_then(match_exact_value)
		.or_else(|| error_description.and_then(match_exact_value))
		.or_else(|| classify_body(error_description))
}

fn match_exact_value(value: &str) -> Option<ProviderErrorKind> {
	if value.eq_ignore_ascii_case("access_denied") {
		Some(ProviderErrorKind::Denied)
	} else if value.eq_ignore_ascii_case("invalid_grant")
		|| value.eq_ignore_ascii_case("bad_verification_code")
	{
		Some(ProviderErrorKind::InvalidGrant)
	} else if value.eq_ignore_ascii_case("invalid_client")
		|| value.eq_ignore_ascii_case("unauthorized_client")
		|| value.eq_ignore_ascii_case("incorrect_client_credentials")
	{
		Some(ProviderErrorKind::InvalidClient)
	} else if value.eq_ignore_ascii_case("temporarily_unavailable")
		|| value.eq_ignore_ascii_case("server_error")
	{
		Some(ProviderErrorKind::Transient)
	} else {
		None
	}
}

fn classify_body(body: Option<&str>) -> Option<ProviderErrorKind> {
	let body = body?;
	let lowered = body.to_ascii_lowercase();

	match lowered.as_str() {
		text if text.contains("access_denied") => Some(ProviderErrorKind::Denied),
		text if text.contains("invalid_grant") || text.contains("bad_verification_code") =>
			Some(ProviderErrorKind::InvalidGrant),
		text if text.contains("invalid_client") => Some(ProviderErrorKind::InvalidClient),
		text if text.contains("temporarily_unavailable") || text.contains("retry") =>
			Some(ProviderErrorKind::Transient),
		_ => None,
	}
}

fn classify_status(status: Option<u16>) -> ProviderErrorKind {
	match status {
		Some(400 | 404 | 410) => ProviderErrorKind::InvalidGrant,
		Some(401 | 403) => ProviderErrorKind::InvalidClient,
		_ => ProviderErrorKind::Transient,
	}
}
