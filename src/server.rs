//! axum adapter: mounts the dispatcher's routes and writes its cookie changes.
//!
//! Routes are mounted per registered strategy, so requests for any other type fall through to
//! the router's 404. `/logout` exists only when at least one strategy is registered; `/` is
//! always served.

// crates.io
use axum::{
	Router,
	extract::{Query, State, rejection::QueryRejection},
	http::{StatusCode, header::LOCATION},
	response::{Html, IntoResponse, Response},
	routing::get,
};
use axum_extra::extract::CookieJar;
use tokio::net::TcpListener;
// self
use crate::{
	_prelude::*,
	cookies::{CookieChange, CookieManager, RequestCookies},
	flows::{AuthState, Dispatcher, FlowRedirect, IndexView},
	provider::CallbackParams,
};

/// Builds the gateway router for `dispatcher`.
pub fn router(dispatcher: Dispatcher) -> Router {
	let mut router = Router::new().route("/", get(index));

	if !dispatcher.registry().is_empty() {
		router = router.route("/logout", get(logout));
	}

	for strategy_type in dispatcher.registry().types() {
		let login_type = strategy_type.to_string();
		let callback_type = strategy_type.to_string();

		router = router
			.route(
				&format!("/{strategy_type}"),
				get(move |State(dispatcher): State<Dispatcher>, jar: CookieJar| {
					login(dispatcher, login_type.clone(), jar)
				}),
			)
			.route(
				&format!("/{strategy_type}/callback"),
				get(
					move |State(dispatcher): State<Dispatcher>,
					      params: Result<Query<CallbackParams>, QueryRejection>,
					      jar: CookieJar| {
						callback(dispatcher, callback_type.clone(), params, jar)
					},
				),
			);

		tracing::info!(strategy = %strategy_type, "Using login with strategy.");
	}

	router.with_state(dispatcher)
}

/// Serves `router` on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
	axum::serve(listener, router.into_make_service())
		.with_graceful_shutdown(async {
			if let Err(e) = tokio::signal::ctrl_c().await {
				tracing::error!(error = %e, "Failed to listen for shutdown signal.");
			}

			tracing::info!("Gracefully shutdown.");
		})
		.await
}

async fn login(dispatcher: Dispatcher, strategy_type: String, jar: CookieJar) -> Response {
	let cookies = request_cookies(dispatcher.cookies(), &jar);

	match dispatcher.request_login(&strategy_type, &cookies).await {
		Ok(redirect) => found(jar, redirect),
		Err(e) => error_response(e),
	}
}

async fn callback(
	dispatcher: Dispatcher,
	strategy_type: String,
	params: Result<Query<CallbackParams>, QueryRejection>,
	jar: CookieJar,
) -> Response {
	let cookies = request_cookies(dispatcher.cookies(), &jar);
	let params = match params {
		Ok(Query(params)) => params,
		Err(e) => {
			tracing::debug!(error = %e, "Malformed callback query.");

			CallbackParams::default()
		},
	};

	match dispatcher.handle_callback(&strategy_type, &params, &cookies).await {
		Ok(redirect) => found(jar, redirect),
		Err(e) => error_response(e),
	}
}

async fn logout(State(dispatcher): State<Dispatcher>, jar: CookieJar) -> Response {
	let cookies = request_cookies(dispatcher.cookies(), &jar);
	let redirect = dispatcher.logout(&cookies).await;

	found(jar, redirect)
}

async fn index(State(dispatcher): State<Dispatcher>, jar: CookieJar) -> Html<String> {
	let view = dispatcher.index(&request_cookies(dispatcher.cookies(), &jar));

	Html(render_index(&view))
}

fn request_cookies(manager: &CookieManager, jar: &CookieJar) -> RequestCookies {
	let policy = manager.policy();
	let value = |name: &str| jar.get(name).map(|cookie| cookie.value().to_owned());

	RequestCookies {
		identity: value(&policy.identity_name),
		profile: value(&policy.profile_name),
		session: value(crate::cookies::SESSION_COOKIE_NAME),
	}
}

fn found(jar: CookieJar, redirect: FlowRedirect) -> Response {
	let jar = redirect.cookies.into_iter().map(CookieChange::into_cookie).fold(jar, CookieJar::add);

	(StatusCode::FOUND, jar, [(LOCATION, redirect.location)]).into_response()
}

fn error_response(error: Error) -> Response {
	match error {
		Error::UnknownStrategy { .. } => StatusCode::NOT_FOUND.into_response(),
		e => {
			tracing::error!(error = %e, "Request failed.");

			StatusCode::INTERNAL_SERVER_ERROR.into_response()
		},
	}
}

/// Renders the index page for `view`.
pub fn render_index(view: &IndexView) -> String {
	let mut body = String::from("<!doctype html>\n<html><head><title>Login</title></head><body>\n");

	match &view.auth {
		AuthState::Authenticated(user) => {
			body.push_str(&format!(
				"<p>{}, <a href=\"/logout\">logout</a></p>\n",
				escape_html(user.display_name())
			));
		},
		AuthState::Anonymous if view.strategies.is_empty() => {
			body.push_str("<p>No login providers are configured.</p>\n");
		},
		AuthState::Anonymous => {
			body.push_str("<ul>\n");

			for strategy in &view.strategies {
				let strategy = escape_html(strategy);
				body.push_str(&format!(
					"<li><a href=\"/{strategy}\">Login with {strategy}</a></li>\n"
				));
			}

			body.push_str("</ul>\n");
		},
	}

	body.push_str("</body></html>\n");

	body
}

fn escape_html(raw: &str) -> String {
	let mut escaped = String::with_capacity(raw.len());

	for c in raw.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#39;"),
			c => escaped.push(c),
		}
	}

	escaped
}
