//! Generic OAuth 2.0 authorization-code strategy driven by a [`ProviderDescriptor`].
//!
//! The code exchange goes through the `oauth2` crate over an [`InstrumentedHandle`], so token
//! endpoint failures can be classified with the HTTP status even when the body is unusable.
//! The access token is then used once, to fetch the profile document, and dropped.

// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, PkceCodeVerifier, RedirectUrl, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
};
use reqwest::header::{ACCEPT, HeaderValue};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{Secret, StrategyType, UserProfile},
	error::{ConfigError, MappingError, ProviderError, ProviderErrorKind},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
	provider::{
		CallbackParams, ClientAuthMethod, ProviderDescriptor, ProviderErrorContext, ProviderProfile,
		Strategy, StrategyFuture,
	},
	session::PendingLogin,
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Maps a provider's profile document into a [`UserProfile`].
pub type ProfileMapper = fn(&ProviderProfile) -> Result<UserProfile, MappingError>;

/// OAuth 2.0 authorization-code strategy with state and (when supported) PKCE.
pub struct OAuthStrategy {
	descriptor: ProviderDescriptor,
	client_id: String,
	callback_url: Url,
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestHttpClient,
	mapper: ProfileMapper,
}
impl OAuthStrategy {
	/// Builds a strategy for `descriptor` using the given client credentials.
	pub fn new(
		descriptor: ProviderDescriptor,
		client_id: impl Into<String>,
		client_secret: Secret,
		callback_url: Url,
		http_client: ReqwestHttpClient,
		mapper: ProfileMapper,
	) -> Result<Self, ConfigError> {
		let client_id = client_id.into();
		let auth_url = AuthUrl::new(descriptor.endpoints.authorization.to_string())?;
		let token_url = TokenUrl::new(descriptor.endpoints.token.to_string())?;
		let redirect_url = RedirectUrl::new(callback_url.to_string())?;
		let mut oauth_client = BasicClient::new(ClientId::new(client_id.clone()))
			.set_client_secret(ClientSecret::new(client_secret.expose().to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url);

		if matches!(descriptor.preferred_client_auth_method, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(Self { descriptor, client_id, callback_url, oauth_client, http_client, mapper })
	}

	async fn exchange_code(
		&self,
		pending: &PendingLogin,
		code: &str,
	) -> Result<String, ProviderError> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let mut request = self.oauth_client.exchange_code(AuthorizationCode::new(code.to_owned()));

		if self.descriptor.quirks.pkce_supported {
			request = request
				.set_pkce_verifier(PkceCodeVerifier::new(pending.code_verifier().to_owned()));
		}

		let response = request
			.request_async(&instrumented)
			.await
			.map_err(|err| self.map_request_error(meta.take(), err))?;

		Ok(response.access_token().secret().to_owned())
	}

	async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, ProviderError> {
		let response = self
			.http_client
			.as_ref()
			.get(self.descriptor.endpoints.profile.clone())
			.bearer_auth(access_token)
			.header(ACCEPT, HeaderValue::from_static("application/json"))
			.send()
			.await?;
		let status = response.status();

		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			let ctx = ProviderErrorContext::default()
				.with_http_status(Some(status.as_u16()))
				.with_body_preview(body);

			return Err(ProviderError::new(
				self.classify_error(&ctx),
				format!("profile endpoint returned {status}"),
			)
			.with_status(Some(status.as_u16())));
		}

		let value = response.json::<Value>().await.map_err(|e| ProviderError {
			kind: ProviderErrorKind::Transient,
			message: "profile endpoint returned a non-JSON body".into(),
			status: Some(status.as_u16()),
			source: Some(Box::new(e)),
		})?;

		Ok(ProviderProfile::new(value))
	}

	fn map_request_error(
		&self,
		meta: Option<ResponseMetadata>,
		err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
	) -> ProviderError {
		let status = meta.and_then(|meta| meta.status);

		match err {
			RequestTokenError::ServerResponse(response) =>
				self.map_server_response_error(response, status),
			RequestTokenError::Request(HttpClientError::Reqwest(inner)) =>
				ProviderError::network(*inner).with_status(status),
			RequestTokenError::Request(other) => ProviderError::new(
				ProviderErrorKind::Transient,
				format!("HTTP client error occurred while calling the token endpoint: {other}"),
			)
			.with_status(status),
			RequestTokenError::Parse(source, body) => {
				let ctx = ProviderErrorContext::default()
					.with_http_status(status)
					.with_body_preview(String::from_utf8_lossy(&body));

				ProviderError {
					kind: self.classify_error(&ctx),
					message: "token endpoint response could not be parsed".into(),
					status,
					source: Some(Box::new(source)),
				}
			},
			RequestTokenError::Other(message) => ProviderError::new(
				ProviderErrorKind::Transient,
				format!("token endpoint returned an unexpected response: {message}"),
			)
			.with_status(status),
		}
	}

	fn map_server_response_error(
		&self,
		response: BasicErrorResponse,
		status: Option<u16>,
	) -> ProviderError {
		let mut ctx = ProviderErrorContext::default()
			.with_http_status(status)
			.with_oauth_error(response.error().as_ref());

		if let Some(description) = response.error_description() {
			ctx = ctx.with_error_description(description.clone());
		}

		let message = match response.error_description() {
			Some(description) => format!("token endpoint returned an OAuth error: {description}"),
			None => format!("token endpoint returned an OAuth error: {}", response.error().as_ref()),
		};

		ProviderError::new(self.classify_error(&ctx), message).with_status(status)
	}
}
impl Strategy for OAuthStrategy {
	fn strategy_type(&self) -> &StrategyType {
		&self.descriptor.id
	}

	fn callback_url(&self) -> &Url {
		&self.callback_url
	}

	fn authorize_url(&self, pending: &PendingLogin) -> Url {
		let mut url = self.descriptor.endpoints.authorization.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", &self.client_id);
		pairs.append_pair("redirect_uri", pending.redirect_uri.as_str());

		if let Some(scope) = self.descriptor.scope_param() {
			pairs.append_pair("scope", &scope);
		}

		pairs.append_pair("state", &pending.state);

		if self.descriptor.quirks.pkce_supported {
			pairs.append_pair("code_challenge", pending.code_challenge());
			pairs.append_pair("code_challenge_method", pending.code_challenge_method().as_str());
		}

		drop(pairs);

		url
	}

	fn exchange<'a>(
		&'a self,
		pending: &'a PendingLogin,
		callback: &'a CallbackParams,
	) -> StrategyFuture<'a, ProviderProfile> {
		Box::pin(async move {
			if let Some(error) = &callback.error {
				let message = match &callback.error_description {
					Some(description) => format!("{error}: {description}"),
					None => error.clone(),
				};

				return Err(ProviderError::new(ProviderErrorKind::Denied, message));
			}

			let code = callback.code.as_deref().filter(|code| !code.is_empty()).ok_or_else(|| {
				ProviderError::new(
					ProviderErrorKind::InvalidGrant,
					"callback carried no authorization code",
				)
			})?;
			let access_token = self.exchange_code(pending, code).await?;

			self.fetch_profile(&access_token).await
		})
	}

	fn to_user(&self, profile: &ProviderProfile) -> Result<UserProfile, MappingError> {
		(self.mapper)(profile)
	}
}
impl Debug for OAuthStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthStrategy")
			.field("descriptor", &self.descriptor)
			.field("client_id", &self.client_id)
			.field("callback_url", &self.callback_url)
			.finish()
	}
}
