//! `Logout`: clear the identity cookies and any pending login.

// self
use crate::{
	_prelude::*,
	cookies::RequestCookies,
	flows::{Dispatcher, FlowRedirect},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::SessionStore,
};

impl Dispatcher {
	/// Clears both identity cookies and redirects home.
	///
	/// Idempotent: an anonymous browser receives the same removals. A pending login referenced
	/// by the session cookie is discarded, and that cookie is cleared too. Session-store
	/// failures are logged and do not block the logout.
	pub async fn logout(&self, cookies: &RequestCookies) -> FlowRedirect {
		const KIND: FlowKind = FlowKind::Logout;

		let span = FlowSpan::new(KIND, "logout");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let redirect = span
			.instrument(async move {
				let mut changes = vec![self.cookies.clear_identity(), self.cookies.clear_profile()];

				if let Some(raw) = cookies.session.as_deref() {
					let discarded = match self.cookies.read_session(raw) {
						Some(id) => <dyn SessionStore>::take(self.sessions.as_ref(), &id).await.map(drop),
						None => Ok(()),
					};

					if let Err(e) = discarded {
						tracing::warn!(error = %e, "Pending login could not be discarded.");
					}

					changes.push(self.cookies.clear_session());
				}

				tracing::debug!(authenticated = cookies.identity.is_some(), "Logged out.");

				FlowRedirect::home(changes)
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::Success);

		redirect
	}
}
