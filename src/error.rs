//! Gateway-level error types shared across the registry, dispatcher, and stores.

// self
use crate::_prelude::*;

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
///
/// Every callback-time variant is folded into the anonymous redirect by the dispatcher; only
/// login-time failures and [`Error::UnknownStrategy`] reach the HTTP layer.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Request referenced a strategy type that is not registered.
	#[error("Strategy `{strategy}` is not registered.")]
	UnknownStrategy {
		/// Strategy type taken from the request.
		strategy: String,
	},
	/// Callback arrived without a matching pending session.
	#[error("Pending session does not match the callback: {reason}.")]
	SessionMismatch {
		/// Why the session was rejected.
		reason: &'static str,
	},
	/// Identity provider rejected or failed the code exchange.
	#[error(transparent)]
	ProviderExchange(#[from] ProviderError),
	/// Provider profile could not be mapped into a user profile.
	#[error(transparent)]
	Mapping(#[from] MappingError),
	/// Token signing or verification failed.
	#[error(transparent)]
	Token(#[from] crate::codec::CodecError),
	/// Profile could not be encoded for the profile cookie.
	#[error("Profile could not be encoded.")]
	ProfileEncode(#[from] serde_json::Error),
	/// The session cookie could not be signed.
	#[error("Session cookie could not be signed.")]
	SessionCookie,
	/// Session-store failure.
	#[error("{0}")]
	Session(
		#[from]
		#[source]
		crate::session::SessionStoreError,
	),
}

/// Configuration and validation failures raised at startup.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required secret is missing or empty; the process must not start.
	#[error("No {key} environment variable specified.")]
	MissingSecret {
		/// Environment key that was expected.
		key: &'static str,
	},
	/// An environment value could not be parsed.
	#[error("Environment variable {key} is invalid: {reason}.")]
	InvalidValue {
		/// Offending environment key.
		key: &'static str,
		/// Parser-supplied reason.
		reason: String,
	},
	/// Strategy type failed identifier validation.
	#[error("Strategy type is invalid.")]
	InvalidStrategyType(#[from] crate::auth::IdentifierError),
	/// Two strategies claimed the same type.
	#[error("Strategy `{strategy}` is registered more than once.")]
	DuplicateStrategy {
		/// Duplicated strategy type.
		strategy: String,
	},
	/// Provider descriptor is invalid.
	#[error(transparent)]
	InvalidDescriptor(#[from] crate::provider::ProviderDescriptorError),
	/// Callback or endpoint URL cannot be parsed.
	#[error("URL is invalid.")]
	InvalidUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<url::ParseError> for ConfigError {
	fn from(source: url::ParseError) -> Self {
		Self::InvalidUrl { source }
	}
}

/// Canonical provider failure categories, used for logs and metrics only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderErrorKind {
	/// The end user (or provider) declined the authorization request.
	Denied,
	/// Provider rejected the authorization code or PKCE verifier.
	InvalidGrant,
	/// Client authentication failed.
	InvalidClient,
	/// Network failure, timeout, or provider-side outage.
	Transient,
}
impl ProviderErrorKind {
	/// Returns a stable label suitable for log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderErrorKind::Denied => "denied",
			ProviderErrorKind::InvalidGrant => "invalid_grant",
			ProviderErrorKind::InvalidClient => "invalid_client",
			ProviderErrorKind::Transient => "transient",
		}
	}
}
impl Display for ProviderErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Failure talking to an identity provider during the callback.
#[derive(Debug, ThisError)]
#[error("Provider exchange failed ({kind}): {message}.")]
pub struct ProviderError {
	/// Classified failure category.
	pub kind: ProviderErrorKind,
	/// Provider- or gateway-supplied message; never shown to the browser.
	pub message: String,
	/// HTTP status code, when available.
	pub status: Option<u16>,
	/// Underlying transport failure, when there is one.
	#[source]
	pub source: Option<BoxError>,
}
impl ProviderError {
	/// Creates a provider error without an underlying source.
	pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
		Self { kind, message: message.into(), status: None, source: None }
	}

	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self {
			kind: ProviderErrorKind::Transient,
			message: "network error while calling the provider".into(),
			status: None,
			source: Some(Box::new(src)),
		}
	}

	/// Attaches the HTTP status returned by the provider.
	pub fn with_status(mut self, status: Option<u16>) -> Self {
		self.status = status;

		self
	}
}
impl From<ReqwestError> for ProviderError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Provider profile payload did not have the shape the mapper expects.
#[derive(Debug, ThisError)]
pub enum MappingError {
	/// The payload could not be deserialized into the provider's profile type.
	#[error("Provider profile is malformed at `{path}`.")]
	Malformed {
		/// JSON path of the offending field.
		path: String,
		/// Structured parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// A field the canonical profile needs is missing or empty.
	#[error("Provider profile is missing `{field}`.")]
	MissingField {
		/// Name of the missing field.
		field: &'static str,
	},
}
impl From<serde_path_to_error::Error<serde_json::Error>> for MappingError {
	fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = e.path().to_string();

		Self::Malformed { path, source: e.into_inner() }
	}
}
