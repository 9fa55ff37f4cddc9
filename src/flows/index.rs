//! `Index`: reflect the browser's current authentication state.

// self
use crate::{
	auth::{StrategyType, UserProfile},
	cookies::RequestCookies,
	flows::Dispatcher,
	obs::{FlowKind, FlowSpan},
};

/// Authentication state derived from the identity cookie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthState {
	/// No identity cookie, or one that did not verify.
	Anonymous,
	/// Verified identity.
	Authenticated(UserProfile),
}

/// Data the index page renders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexView {
	/// Current state.
	pub auth: AuthState,
	/// Login choices, in mount order. Empty while authenticated.
	pub strategies: Vec<StrategyType>,
}
impl IndexView {
	/// Profile of the signed-in user, if any.
	pub fn user(&self) -> Option<&UserProfile> {
		match &self.auth {
			AuthState::Authenticated(user) => Some(user),
			AuthState::Anonymous => None,
		}
	}
}

impl Dispatcher {
	/// Verifies the identity cookie and lists login choices for anonymous browsers.
	///
	/// The profile cookie is display-only and never trusted here.
	pub fn index(&self, cookies: &RequestCookies) -> IndexView {
		let _span = FlowSpan::new(FlowKind::Index, "index").entered();
		let verified = cookies.identity.as_deref().and_then(|token| {
			self.codec
				.verify(token)
				.inspect_err(|e| tracing::debug!(error = %e, "Ignoring identity cookie."))
				.ok()
		});

		match verified {
			Some(user) => IndexView { auth: AuthState::Authenticated(user), strategies: Vec::new() },
			None => IndexView {
				auth: AuthState::Anonymous,
				strategies: self.registry.types().cloned().collect(),
			},
		}
	}
}
