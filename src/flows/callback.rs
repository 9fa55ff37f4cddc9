//! `HandleCallback`: finish the provider round trip and mint the identity cookies.
//!
//! Every callback for a registered strategy ends in a redirect home. Failures are logged and
//! folded into the anonymous outcome; the browser never sees provider error detail.

// self
use crate::{
	_prelude::*,
	cookies::{CookieChange, RequestCookies},
	flows::{Dispatcher, FlowRedirect},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{CallbackParams, Strategy},
	session::SessionStore,
};

impl Dispatcher {
	/// Completes a login for `strategy_type`.
	///
	/// Only [`Error::UnknownStrategy`] is returned; any other failure clears the pending
	/// session and redirects home without identity cookies.
	pub async fn handle_callback(
		&self,
		strategy_type: &str,
		params: &CallbackParams,
		cookies: &RequestCookies,
	) -> Result<FlowRedirect> {
		const KIND: FlowKind = FlowKind::Callback;

		let span = FlowSpan::new(KIND, "handle_callback");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let strategy = match self.registry.get(strategy_type) {
			Some(strategy) => strategy.clone(),
			None => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);

				return Err(Error::UnknownStrategy { strategy: strategy_type.to_owned() });
			},
		};
		let outcome = span.instrument(self.complete(strategy.as_ref(), params, cookies)).await;
		let mut changes = match outcome {
			Ok(changes) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Success);
				tracing::info!(strategy = %strategy.strategy_type(), "Login completed.");

				changes
			},
			Err(e) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				log_failure(strategy.strategy_type(), &e);

				Vec::new()
			},
		};

		if cookies.session.is_some() {
			changes.push(self.cookies.clear_session());
		}

		Ok(FlowRedirect::home(changes))
	}

	async fn complete(
		&self,
		strategy: &dyn Strategy,
		params: &CallbackParams,
		cookies: &RequestCookies,
	) -> Result<Vec<CookieChange>> {
		let id = cookies
			.session
			.as_deref()
			.and_then(|raw| self.cookies.read_session(raw))
			.ok_or(Error::SessionMismatch { reason: "no valid session cookie" })?;
		let pending = <dyn SessionStore>::take(self.sessions.as_ref(), &id)
			.await?
			.ok_or(Error::SessionMismatch { reason: "no pending login for this session" })?;

		pending.validate(strategy.strategy_type(), params.state.as_deref())?;

		let profile = strategy.exchange(&pending, params).await?;
		let user = strategy.to_user(&profile)?;
		let token = self.codec.sign(&user)?;
		let profile_cookie = self.cookies.profile(&user, token.expires_at)?;

		Ok(vec![self.cookies.identity(&token), profile_cookie])
	}
}

fn log_failure(strategy: &crate::auth::StrategyType, error: &Error) {
	match error {
		Error::ProviderExchange(e) => tracing::warn!(
			%strategy,
			kind = %e.kind,
			status = ?e.status,
			error = %e,
			"Provider exchange failed; browser stays anonymous."
		),
		e => tracing::warn!(%strategy, error = %e, "Callback rejected; browser stays anonymous."),
	}
}
