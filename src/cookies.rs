//! Cookie Manager: the single place that knows cookie names, domain, path, and lifetimes.
//!
//! Every cookie the gateway sets is built here, and so is every cookie it clears. Clearing
//! reuses the exact domain/path of the setter; a mismatch would leave a stale cookie behind
//! in the browser.

// crates.io
use cookie::{Cookie, CookieJar, Key, SameSite};
use sha2::{Digest, Sha512};
// self
use crate::{
	_prelude::*,
	auth::{IdentityToken, Secret, SessionId, UserProfile},
};

/// Name of the signed cookie carrying the pending-session id.
pub const SESSION_COOKIE_NAME: &str = "lw.sid";
const COOKIE_PATH: &str = "/";

/// Names, scope, and lifetimes applied to gateway cookies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CookiePolicy {
	/// Identity (signed token) cookie name.
	pub identity_name: String,
	/// Profile snapshot cookie name.
	pub profile_name: String,
	/// Domain attribute for identity and profile cookies; `None` keeps them host-only.
	pub domain: Option<String>,
	/// Lifetime shared by the identity and profile cookies.
	pub max_age: Duration,
	/// Lifetime of the pending-session cookie.
	pub session_max_age: Duration,
	/// Adds the `Secure` attribute (HTTPS deployments).
	pub secure: bool,
}
impl Default for CookiePolicy {
	fn default() -> Self {
		Self {
			identity_name: "jwt".into(),
			profile_name: "profile".into(),
			domain: None,
			max_age: Duration::days(10),
			session_max_age: Duration::minutes(10),
			secure: false,
		}
	}
}

/// A cookie the HTTP adapter must write onto the response.
#[derive(Clone, Debug, PartialEq)]
pub enum CookieChange {
	/// Set or overwrite the cookie.
	Set(Cookie<'static>),
	/// Expire the cookie; the carried cookie is already a removal with matching scope.
	Remove(Cookie<'static>),
}
impl CookieChange {
	/// Cookie name affected by the change.
	pub fn name(&self) -> &str {
		self.cookie().name()
	}

	/// Borrowed view of the cookie to write.
	pub fn cookie(&self) -> &Cookie<'static> {
		match self {
			CookieChange::Set(cookie) | CookieChange::Remove(cookie) => cookie,
		}
	}

	/// Returns the cookie to write, consuming the change.
	pub fn into_cookie(self) -> Cookie<'static> {
		match self {
			CookieChange::Set(cookie) | CookieChange::Remove(cookie) => cookie,
		}
	}

	/// Returns `true` for removals.
	pub fn is_removal(&self) -> bool {
		matches!(self, CookieChange::Remove(_))
	}
}

/// Raw cookie values the browser sent with a request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestCookies {
	/// Identity cookie value.
	pub identity: Option<String>,
	/// Profile cookie value.
	pub profile: Option<String>,
	/// Signed session cookie value.
	pub session: Option<String>,
}

/// Builds and reads gateway cookies according to a [`CookiePolicy`].
#[derive(Clone)]
pub struct CookieManager {
	policy: CookiePolicy,
	key: Key,
}
impl CookieManager {
	/// Creates a manager; the session cookie is signed with a key derived from `session_secret`.
	pub fn new(policy: CookiePolicy, session_secret: &Secret) -> Self {
		let digest = Sha512::digest(session_secret.expose().as_bytes());

		Self { policy, key: Key::from(&digest[..]) }
	}

	/// Active policy.
	pub fn policy(&self) -> &CookiePolicy {
		&self.policy
	}

	/// httpOnly cookie carrying the signed identity token.
	pub fn identity(&self, token: &IdentityToken) -> CookieChange {
		let mut cookie = self.scoped(&self.policy.identity_name, token.expose().to_owned());

		cookie.set_http_only(true);
		cookie.set_max_age(self.policy.max_age);
		cookie.set_expires(token.expires_at);

		CookieChange::Set(cookie)
	}

	/// Script-readable cookie carrying the profile as plain JSON.
	pub fn profile(&self, profile: &UserProfile, expires_at: OffsetDateTime) -> Result<CookieChange> {
		let mut cookie = self.scoped(&self.policy.profile_name, serde_json::to_string(profile)?);

		cookie.set_http_only(false);
		cookie.set_max_age(self.policy.max_age);
		cookie.set_expires(expires_at);

		Ok(CookieChange::Set(cookie))
	}

	/// Signed, host-only cookie carrying the pending-session id.
	///
	/// Only the signed cookie is ever returned; there is no unsigned fallback.
	pub fn session(&self, id: &SessionId) -> Result<CookieChange> {
		let mut jar = CookieJar::new();
		let mut cookie = Cookie::new(SESSION_COOKIE_NAME, id.to_string());

		cookie.set_path(COOKIE_PATH);
		cookie.set_http_only(true);
		cookie.set_secure(self.policy.secure);
		cookie.set_same_site(SameSite::Lax);
		cookie.set_max_age(self.policy.session_max_age);
		jar.signed_mut(&self.key).add(cookie);

		jar.delta()
			.find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
			.cloned()
			.map(CookieChange::Set)
			.ok_or(Error::SessionCookie)
	}

	/// Removal for the identity cookie.
	pub fn clear_identity(&self) -> CookieChange {
		Self::removal(self.scoped(&self.policy.identity_name, String::new()))
	}

	/// Removal for the profile cookie.
	pub fn clear_profile(&self) -> CookieChange {
		Self::removal(self.scoped(&self.policy.profile_name, String::new()))
	}

	/// Removal for the session cookie.
	pub fn clear_session(&self) -> CookieChange {
		let mut cookie = Cookie::new(SESSION_COOKIE_NAME, "");

		cookie.set_path(COOKIE_PATH);

		Self::removal(cookie)
	}

	/// Verifies a raw session cookie value, returning the id it carries.
	///
	/// Unsigned, tampered, or malformed values yield `None`.
	pub fn read_session(&self, raw: &str) -> Option<SessionId> {
		let mut jar = CookieJar::new();

		jar.add_original(Cookie::new(SESSION_COOKIE_NAME, raw.to_owned()));

		let verified = jar.signed(&self.key).get(SESSION_COOKIE_NAME)?;

		SessionId::new(verified.value()).ok()
	}

	fn scoped(&self, name: &str, value: String) -> Cookie<'static> {
		let mut cookie = Cookie::new(name.to_owned(), value);

		cookie.set_path(COOKIE_PATH);
		cookie.set_secure(self.policy.secure);
		cookie.set_same_site(SameSite::Lax);

		if let Some(domain) = &self.policy.domain {
			cookie.set_domain(domain.clone());
		}

		cookie
	}

	fn removal(mut cookie: Cookie<'static>) -> CookieChange {
		cookie.make_removal();

		CookieChange::Remove(cookie)
	}
}
impl Debug for CookieManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CookieManager").field("policy", &self.policy).finish()
	}
}
