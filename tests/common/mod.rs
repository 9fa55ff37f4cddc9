//! Shared wiring for integration tests: an HTTPS mock provider and a dispatcher over it.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use reqwest::Client as ReqwestClient;
use time::Duration;
// self
use auth_gateway::{
	auth::{Secret, StrategyType},
	codec::JwtCodec,
	cookies::{CookieManager, CookiePolicy},
	flows::Dispatcher,
	http::ReqwestHttpClient,
	provider::{
		ClientAuthMethod, OAuthStrategy, ProviderDescriptor, StrategyRegistry, callback_url,
		github_user,
	},
	session::MemorySessionStore,
	url::Url,
};

pub const CLIENT_ID: &str = "client-it";
pub const CLIENT_SECRET: &str = "secret-it";
pub const JWT_SECRET: &str = "jwt-secret-it";
pub const SESSION_SECRET: &str = "session-secret-it";
pub const ROOT_URL: &str = "http://localhost:3000";

/// Reqwest client that trusts the mock server's self-signed certificate.
pub fn test_http_client() -> ReqwestHttpClient {
	let client = ReqwestClient::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.redirect(reqwest::redirect::Policy::none())
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

/// GitHub-shaped descriptor pointing at `server`.
pub fn build_descriptor(server: &MockServer, strategy_type: &str) -> ProviderDescriptor {
	let id = StrategyType::new(strategy_type).expect("Strategy type should be valid for tests.");

	ProviderDescriptor::builder(id)
		.authorization_endpoint(
			Url::parse(&server.url("/authorize"))
				.expect("Mock authorization endpoint should parse successfully."),
		)
		.token_endpoint(
			Url::parse(&server.url("/token")).expect("Mock token endpoint should parse successfully."),
		)
		.profile_endpoint(
			Url::parse(&server.url("/user")).expect("Mock profile endpoint should parse successfully."),
		)
		.scopes(["user:email"])
		.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost)
		.build()
		.expect("Provider descriptor should build successfully.")
}

/// Registry with one GitHub-mapped strategy per type, all backed by `server`.
pub fn build_registry(server: &MockServer, types: &[&str]) -> StrategyRegistry {
	let root = Url::parse(ROOT_URL).expect("Root URL should parse successfully.");
	let mut registry = StrategyRegistry::new();

	for ty in types {
		let descriptor = build_descriptor(server, ty);
		let callback = callback_url(&root, &descriptor.id).expect("Callback URL should resolve.");
		let strategy = OAuthStrategy::new(
			descriptor,
			CLIENT_ID,
			Secret::new(CLIENT_SECRET),
			callback,
			test_http_client(),
			github_user,
		)
		.expect("OAuth strategy should build successfully.");

		registry.register(Arc::new(strategy)).expect("Strategy should register once.");
	}

	registry
}

/// Dispatcher over `registry` with in-memory sessions and the test secrets.
pub fn build_dispatcher(registry: StrategyRegistry) -> (Dispatcher, Arc<MemorySessionStore>) {
	let sessions = Arc::new(MemorySessionStore::default());
	let codec = Arc::new(JwtCodec::new(&Secret::new(JWT_SECRET), Duration::days(10)));
	let cookies = CookieManager::new(CookiePolicy::default(), &Secret::new(SESSION_SECRET));

	(Dispatcher::new(registry, sessions.clone(), codec, cookies), sessions)
}

/// Query value `key` of `location`.
pub fn query_value(location: &str, key: &str) -> Option<String> {
	Url::parse(location)
		.ok()?
		.query_pairs()
		.find(|(k, _)| k == key)
		.map(|(_, value)| value.into_owned())
}
