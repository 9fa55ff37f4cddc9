//! Authentication-Flow Dispatcher: the per-browser state machine behind every route.
//!
//! A browser moves `anonymous → pending(strategy) → authenticated → anonymous`. The pending
//! step lives in the [`SessionStore`], keyed by the signed session cookie; the authenticated
//! step lives entirely in the identity cookie. The dispatcher never writes HTTP responses.
//! Each operation returns the redirect target and the [`CookieChange`]s the adapter must apply.

pub mod callback;
pub mod index;
pub mod login;
pub mod logout;

pub use index::*;

// self
use crate::{
	_prelude::*,
	codec::TokenCodec,
	cookies::{CookieChange, CookieManager},
	provider::StrategyRegistry,
	session::SessionStore,
};

/// Path every completed flow redirects to.
pub const ROOT_PATH: &str = "/";

/// Redirect produced by a dispatcher operation.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowRedirect {
	/// `Location` header value.
	pub location: String,
	/// Cookies to set or clear on the redirect response, in order.
	pub cookies: Vec<CookieChange>,
}
impl FlowRedirect {
	/// Redirect to the application root.
	pub fn home(cookies: Vec<CookieChange>) -> Self {
		Self { location: ROOT_PATH.into(), cookies }
	}
}

/// Drives login, callback, logout, and index against the configured collaborators.
#[derive(Clone)]
pub struct Dispatcher {
	registry: Arc<StrategyRegistry>,
	sessions: Arc<dyn SessionStore>,
	codec: Arc<dyn TokenCodec>,
	cookies: CookieManager,
}
impl Dispatcher {
	/// Creates a dispatcher over an immutable registry.
	pub fn new(
		registry: impl Into<Arc<StrategyRegistry>>,
		sessions: Arc<dyn SessionStore>,
		codec: Arc<dyn TokenCodec>,
		cookies: CookieManager,
	) -> Self {
		Self { registry: registry.into(), sessions, codec, cookies }
	}

	/// Registered strategies.
	pub fn registry(&self) -> &StrategyRegistry {
		&self.registry
	}

	/// Cookie manager shared with the HTTP adapter.
	pub fn cookies(&self) -> &CookieManager {
		&self.cookies
	}
}
impl Debug for Dispatcher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Dispatcher")
			.field("registry", &self.registry)
			.field("cookies", &self.cookies)
			.finish()
	}
}
