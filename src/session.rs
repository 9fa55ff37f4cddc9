//! Session Broker: short-lived, per-browser state that spans the provider round trip.
//!
//! A [`PendingLogin`] is written when the browser is sent to a provider and taken (read and
//! removed in one step) when the provider redirects back. Nothing else is stored server side.

pub mod memory;

pub use memory::MemorySessionStore;

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{SessionId, StrategyType},
};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;

/// Boxed future returned by [`SessionStore`] operations.
pub type SessionFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, SessionStoreError>> + 'a + Send>>;

/// Storage contract for pending login sessions.
///
/// Implementations must partition entries by [`SessionId`] so unrelated browsers never observe
/// each other's state, and should expire entries after a bounded TTL.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Stores (or replaces) the pending login for `id`.
	fn insert(&self, id: SessionId, pending: PendingLogin) -> SessionFuture<'_, ()>;

	/// Removes and returns the pending login for `id`, if present and not expired.
	fn take<'a>(&'a self, id: &'a SessionId) -> SessionFuture<'a, Option<PendingLogin>>;
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SessionStoreError {
	/// Backend-level failure for the storage engine.
	#[error("Session backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Supported PKCE challenge methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// State recorded between `RequestLogin` and `HandleCallback` for one browser.
#[derive(Clone)]
pub struct PendingLogin {
	/// Strategy the browser was sent to.
	pub strategy: StrategyType,
	/// Opaque CSRF nonce that must round-trip via the provider redirect.
	pub state: String,
	/// Callback URL registered with the provider for this strategy.
	pub redirect_uri: Url,
	pkce: PkcePair,
}
impl PendingLogin {
	/// Starts a pending login with a fresh state nonce and PKCE pair.
	pub fn new(strategy: StrategyType, redirect_uri: Url) -> Self {
		Self {
			strategy,
			state: random_string(STATE_LEN),
			redirect_uri,
			pkce: PkcePair::generate(),
		}
	}

	/// PKCE code challenge derived from the secret verifier.
	pub fn code_challenge(&self) -> &str {
		&self.pkce.challenge
	}

	/// PKCE challenge method (currently always `S256`).
	pub fn code_challenge_method(&self) -> PkceCodeChallengeMethod {
		self.pkce.method
	}

	/// PKCE verifier sent on the code exchange. Callers must avoid logging it.
	pub fn code_verifier(&self) -> &str {
		&self.pkce.verifier
	}

	/// Checks that a callback for `strategy` carrying `returned_state` belongs to this login.
	pub fn validate(&self, strategy: &StrategyType, returned_state: Option<&str>) -> Result<()> {
		if &self.strategy != strategy {
			return Err(Error::SessionMismatch { reason: "callback is for a different strategy" });
		}

		match returned_state {
			Some(state) if state == self.state => Ok(()),
			Some(_) => Err(Error::SessionMismatch { reason: "state mismatch" }),
			None => Err(Error::SessionMismatch { reason: "state missing" }),
		}
	}
}
impl Debug for PendingLogin {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PendingLogin")
			.field("strategy", &self.strategy)
			.field("state", &self.state)
			.field("redirect_uri", &self.redirect_uri)
			.field("code_challenge", &self.pkce.challenge)
			.field("code_challenge_method", &self.pkce.method)
			.finish()
	}
}

#[derive(Clone)]
struct PkcePair {
	verifier: String,
	challenge: String,
	method: PkceCodeChallengeMethod,
}
impl PkcePair {
	fn generate() -> Self {
		let verifier = random_string(PKCE_VERIFIER_LEN);
		let challenge = compute_pkce_challenge(&verifier);

		Self { verifier, challenge, method: PkceCodeChallengeMethod::S256 }
	}
}

/// Random alphanumeric string used for nonces, verifiers, and session ids.
pub(crate) fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn compute_pkce_challenge(verifier: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(verifier.as_bytes());
	let digest = hasher.finalize();
	URL_SAFE_NO_PAD.encode(digest)
}
