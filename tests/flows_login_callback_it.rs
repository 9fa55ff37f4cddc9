mod common;

// crates.io
use httpmock::prelude::*;
// self
use auth_gateway::{
	auth::{Secret, UserProfile},
	codec::{JwtCodec, TokenCodec},
	cookies::{CookieChange, RequestCookies, SESSION_COOKIE_NAME},
	flows::{AuthState, Dispatcher},
	provider::CallbackParams,
};
use common::*;

const TOKEN_BODY: &str =
	"{\"access_token\":\"access-it\",\"token_type\":\"bearer\",\"expires_in\":3600}";
const USER_BODY: &str = "{\"id\":42,\"login\":\"octo\",\"name\":\"Octo Cat\",\"email\":\"octo@example.com\",\"avatar_url\":\"https://avatars.example.com/42\"}";

/// Starts a login and returns the browser's cookies plus the state sent to the provider.
async fn start_login(dispatcher: &Dispatcher) -> (RequestCookies, String) {
	let redirect = dispatcher
		.request_login("github", &RequestCookies::default())
		.await
		.expect("Login should start for a registered strategy.");
	let state = query_value(&redirect.location, "state")
		.expect("Authorize redirect should carry the state parameter.");
	let session = redirect
		.cookies
		.iter()
		.find(|change| change.name() == SESSION_COOKIE_NAME)
		.map(|change| change.cookie().value().to_owned());

	(RequestCookies { session, ..Default::default() }, state)
}

fn callback(code: &str, state: &str) -> CallbackParams {
	CallbackParams { code: Some(code.into()), state: Some(state.into()), ..Default::default() }
}

fn set_names(changes: &[CookieChange]) -> Vec<&str> {
	changes.iter().filter(|change| !change.is_removal()).map(CookieChange::name).collect()
}

#[tokio::test]
async fn login_redirects_to_the_provider_with_state_and_pkce() {
	let server = MockServer::start_async().await;
	let (dispatcher, sessions) = build_dispatcher(build_registry(&server, &["github"]));
	let redirect = dispatcher
		.request_login("github", &RequestCookies::default())
		.await
		.expect("Login should start for a registered strategy.");

	assert!(redirect.location.starts_with(&server.url("/authorize")));
	assert_eq!(query_value(&redirect.location, "client_id").as_deref(), Some(CLIENT_ID));
	assert_eq!(
		query_value(&redirect.location, "redirect_uri").as_deref(),
		Some("http://localhost:3000/github/callback")
	);
	assert_eq!(query_value(&redirect.location, "scope").as_deref(), Some("user:email"));
	assert_eq!(query_value(&redirect.location, "code_challenge_method").as_deref(), Some("S256"));
	assert_eq!(set_names(&redirect.cookies), [SESSION_COOKIE_NAME]);
	assert_eq!(sessions.len(), 1);
}

#[tokio::test]
async fn callback_exchanges_code_and_sets_identity_cookies() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let user_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/user").header("authorization", "Bearer access-it");
			then.status(200).header("content-type", "application/json").body(USER_BODY);
		})
		.await;
	let (dispatcher, sessions) = build_dispatcher(build_registry(&server, &["github"]));
	let (jar, state) = start_login(&dispatcher).await;
	let redirect = dispatcher
		.handle_callback("github", &callback("code-it", &state), &jar)
		.await
		.expect("Callback for a registered strategy should redirect.");

	token_mock.assert_async().await;
	user_mock.assert_async().await;

	assert_eq!(redirect.location, "/");
	assert_eq!(set_names(&redirect.cookies), ["jwt", "profile"]);
	assert!(
		redirect
			.cookies
			.iter()
			.any(|change| change.name() == SESSION_COOKIE_NAME && change.is_removal())
	);
	assert!(sessions.is_empty());

	let expected = UserProfile::new("42")
		.with_name(Some("Octo Cat"))
		.with_email(Some("octo@example.com"))
		.with_avatar(Some("https://avatars.example.com/42"));
	let codec = JwtCodec::new(&Secret::new(JWT_SECRET), time::Duration::days(10));
	let verified = codec
		.verify(redirect.cookies[0].cookie().value())
		.expect("Identity token should verify with the gateway secret.");

	assert_eq!(verified, expected);

	let profile = serde_json::from_str::<UserProfile>(redirect.cookies[1].cookie().value())
		.expect("Profile cookie should hold the profile as JSON.");

	assert_eq!(profile, expected);

	let browser = RequestCookies {
		identity: Some(redirect.cookies[0].cookie().value().to_owned()),
		profile: Some(redirect.cookies[1].cookie().value().to_owned()),
		session: None,
	};

	assert_eq!(dispatcher.index(&browser).auth, AuthState::Authenticated(expected));
}

#[tokio::test]
async fn rejected_code_leaves_the_browser_anonymous() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"already used\"}");
		})
		.await;
	let user_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/user");
			then.status(200).header("content-type", "application/json").body(USER_BODY);
		})
		.await;
	let (dispatcher, sessions) = build_dispatcher(build_registry(&server, &["github"]));
	let (jar, state) = start_login(&dispatcher).await;
	let redirect = dispatcher
		.handle_callback("github", &callback("used-code", &state), &jar)
		.await
		.expect("Failed exchanges should still redirect.");

	token_mock.assert_async().await;

	assert_eq!(user_mock.hits_async().await, 0);
	assert_eq!(redirect.location, "/");
	assert!(set_names(&redirect.cookies).is_empty());
	assert!(sessions.is_empty(), "The pending login is consumed even when the exchange fails.");
}

#[tokio::test]
async fn profile_endpoint_failure_leaves_the_browser_anonymous() {
	let server = MockServer::start_async().await;
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let user_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/user");
			then.status(500).body("upstream unavailable");
		})
		.await;
	let (dispatcher, _) = build_dispatcher(build_registry(&server, &["github"]));
	let (jar, state) = start_login(&dispatcher).await;
	let redirect = dispatcher
		.handle_callback("github", &callback("code-it", &state), &jar)
		.await
		.expect("Failed profile fetches should still redirect.");

	user_mock.assert_async().await;

	assert_eq!(redirect.location, "/");
	assert!(set_names(&redirect.cookies).is_empty());
}

#[tokio::test]
async fn provider_denial_skips_the_token_endpoint() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let (dispatcher, _) = build_dispatcher(build_registry(&server, &["github"]));
	let (jar, state) = start_login(&dispatcher).await;
	let params = CallbackParams {
		state: Some(state),
		error: Some("access_denied".into()),
		error_description: Some("The user denied the request.".into()),
		..Default::default()
	};
	let redirect = dispatcher
		.handle_callback("github", &params, &jar)
		.await
		.expect("Denied logins should still redirect.");

	assert_eq!(token_mock.hits_async().await, 0);
	assert!(set_names(&redirect.cookies).is_empty());
}
