//! `RequestLogin`: record a pending login and send the browser to the provider.

// self
use crate::{
	_prelude::*,
	auth::SessionId,
	cookies::RequestCookies,
	flows::{Dispatcher, FlowRedirect},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::{PendingLogin, SessionStore},
};

impl Dispatcher {
	/// Starts a login with `strategy_type`.
	///
	/// A fresh session id is minted for every attempt and any pending login the browser still
	/// holds is discarded. Only the session cookie is set; identity cookies are untouched.
	pub async fn request_login(
		&self,
		strategy_type: &str,
		cookies: &RequestCookies,
	) -> Result<FlowRedirect> {
		const KIND: FlowKind = FlowKind::Login;

		let span = FlowSpan::new(KIND, "request_login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let strategy = self
					.registry
					.get(strategy_type)
					.ok_or_else(|| Error::UnknownStrategy { strategy: strategy_type.to_owned() })?;

				if let Some(previous) =
					cookies.session.as_deref().and_then(|raw| self.cookies.read_session(raw))
				{
					<dyn SessionStore>::take(self.sessions.as_ref(), &previous).await?;
				}

				let id = SessionId::generate();
				let pending = PendingLogin::new(
					strategy.strategy_type().clone(),
					strategy.callback_url().clone(),
				);
				let location = strategy.authorize_url(&pending);
				let session_cookie = self.cookies.session(&id)?;

				<dyn SessionStore>::insert(self.sessions.as_ref(), id.clone(), pending).await?;

				tracing::info!(strategy = %strategy.strategy_type(), "Redirecting to provider.");

				Ok(FlowRedirect {
					location: location.into(),
					cookies: vec![session_cookie],
				})
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
