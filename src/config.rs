//! Gateway configuration read from an environment snapshot.
//!
//! Loading takes an explicit map instead of reading the process environment, so it stays pure.
//! The binary passes `std::env::vars()` after `.env` has been applied.

// self
use crate::{_prelude::*, auth::Secret, cookies::CookiePolicy, error::ConfigError, http};

/// Token-signing secret.
pub const JWT_SECRET_KEY: &str = "LW_JWT_SECRET";
/// Session-cookie signing secret.
pub const SESSION_SECRET_KEY: &str = "LW_SESSION_SECRET";
/// Public host of the gateway.
pub const SUBDOMAIN_KEY: &str = "LW_SUBDOMAIN";
/// Identity cookie name override.
pub const JWT_COOKIE_NAME_KEY: &str = "LW_JWT_COOKIENAME";
/// Profile cookie name override.
pub const PROFILE_COOKIE_NAME_KEY: &str = "LW_PROFILE_COOKIENAME";
/// Cookie and token lifetime in milliseconds.
pub const COOKIE_MAX_AGE_KEY: &str = "LW_COOKIE_MAXAGE";
/// Pending-session lifetime in seconds.
pub const SESSION_TTL_KEY: &str = "LW_SESSION_TTL";
/// Outbound provider call timeout in milliseconds.
pub const EXCHANGE_TIMEOUT_KEY: &str = "LW_EXCHANGE_TIMEOUT";

const DEFAULT_COOKIE_MAX_AGE: Duration = Duration::days(10);
const DEFAULT_SESSION_TTL: Duration = Duration::minutes(10);
/// Upper bound for every configured duration; expiry timestamps must stay representable.
const MAX_DURATION: Duration = Duration::days(3650);

/// Validated gateway settings.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
	/// Listen port; also used for the local root URL.
	pub port: u16,
	/// Token-signing secret.
	pub jwt_secret: Secret,
	/// Session-cookie signing secret.
	pub session_secret: Secret,
	/// Public host, e.g. `login.example.com`.
	pub subdomain: Option<String>,
	/// Identity cookie name.
	pub identity_cookie_name: String,
	/// Profile cookie name.
	pub profile_cookie_name: String,
	/// Lifetime of the identity token and both cookies.
	pub cookie_max_age: Duration,
	/// Lifetime of a pending login.
	pub session_ttl: Duration,
	/// Bound on each outbound provider call.
	pub exchange_timeout: Duration,
}
impl GatewayConfig {
	/// Reads settings from `env`. Missing or blank secrets are fatal.
	pub fn from_env(env: &BTreeMap<String, String>, port: u16) -> Result<Self, ConfigError> {
		let jwt_secret = required_secret(env, JWT_SECRET_KEY)?;
		let session_secret = required_secret(env, SESSION_SECRET_KEY)?;

		Ok(Self {
			port,
			jwt_secret,
			session_secret,
			subdomain: optional(env, SUBDOMAIN_KEY).map(ToOwned::to_owned),
			identity_cookie_name: cookie_name(env, JWT_COOKIE_NAME_KEY, "jwt")?,
			profile_cookie_name: cookie_name(env, PROFILE_COOKIE_NAME_KEY, "profile")?,
			cookie_max_age: positive(env, COOKIE_MAX_AGE_KEY, Duration::milliseconds)?
				.unwrap_or(DEFAULT_COOKIE_MAX_AGE),
			session_ttl: positive(env, SESSION_TTL_KEY, Duration::seconds)?
				.unwrap_or(DEFAULT_SESSION_TTL),
			exchange_timeout: positive(env, EXCHANGE_TIMEOUT_KEY, Duration::milliseconds)?
				.unwrap_or(http::DEFAULT_TIMEOUT),
		})
	}

	/// Whether the gateway is served over HTTPS (a public subdomain is configured).
	pub fn is_secure(&self) -> bool {
		self.subdomain.is_some()
	}

	/// Root URL used to build callback URLs.
	pub fn root_url(&self) -> Result<Url, ConfigError> {
		let raw = match &self.subdomain {
			Some(subdomain) => format!("https://{subdomain}"),
			None => format!("http://localhost:{}", self.port),
		};

		Ok(Url::parse(&raw)?)
	}

	/// Domain shared by the identity and profile cookies.
	///
	/// `login.example.com` yields `.example.com`; no subdomain, or one without a parent domain,
	/// yields `None` (host-only cookies).
	pub fn cookie_domain(&self) -> Option<String> {
		let subdomain = self.subdomain.as_deref()?;
		let host = subdomain.split(':').next().unwrap_or(subdomain);
		let (_, parent) = host.split_once('.')?;

		if parent.is_empty() || !parent.contains('.') {
			return None;
		}

		Some(format!(".{parent}"))
	}

	/// Cookie policy derived from these settings.
	pub fn cookie_policy(&self) -> CookiePolicy {
		CookiePolicy {
			identity_name: self.identity_cookie_name.clone(),
			profile_name: self.profile_cookie_name.clone(),
			domain: self.cookie_domain(),
			max_age: self.cookie_max_age,
			session_max_age: self.session_ttl,
			secure: self.is_secure(),
		}
	}
}

fn optional<'a>(env: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
	env.get(key).map(|value| value.trim()).filter(|value| !value.is_empty())
}

fn required_secret(
	env: &BTreeMap<String, String>,
	key: &'static str,
) -> Result<Secret, ConfigError> {
	optional(env, key).map(Secret::new).ok_or(ConfigError::MissingSecret { key })
}

fn cookie_name(
	env: &BTreeMap<String, String>,
	key: &'static str,
	default: &str,
) -> Result<String, ConfigError> {
	let Some(name) = optional(env, key) else {
		return Ok(default.to_owned());
	};

	if name.chars().any(|c| c.is_ascii_control() || "()<>@,;:\\\"/[]?={} \t".contains(c)) {
		return Err(ConfigError::InvalidValue { key, reason: "not a valid cookie name".into() });
	}

	Ok(name.to_owned())
}

fn positive(
	env: &BTreeMap<String, String>,
	key: &'static str,
	unit: fn(i64) -> Duration,
) -> Result<Option<Duration>, ConfigError> {
	let Some(raw) = optional(env, key) else {
		return Ok(None);
	};
	let value = raw
		.parse::<i64>()
		.map_err(|e| ConfigError::InvalidValue { key, reason: e.to_string() })?;

	if value <= 0 {
		return Err(ConfigError::InvalidValue { key, reason: "must be positive".into() });
	}

	let duration = unit(value);

	if duration > MAX_DURATION {
		return Err(ConfigError::InvalidValue { key, reason: "must not exceed ten years".into() });
	}

	Ok(Some(duration))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
		pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
	}

	fn secrets() -> Vec<(&'static str, &'static str)> {
		vec![(JWT_SECRET_KEY, "jwt-secret"), (SESSION_SECRET_KEY, "session-secret")]
	}

	#[test]
	fn missing_secrets_are_fatal() {
		let err = GatewayConfig::from_env(&env(&[(SESSION_SECRET_KEY, "s")]), 3000)
			.expect_err("Missing token secret must fail.");

		assert!(matches!(err, ConfigError::MissingSecret { key: JWT_SECRET_KEY }));

		let blank_session = env(&[(JWT_SECRET_KEY, "j"), (SESSION_SECRET_KEY, " ")]);
		let err = GatewayConfig::from_env(&blank_session, 3000)
			.expect_err("Blank session secret must fail.");

		assert!(matches!(err, ConfigError::MissingSecret { key: SESSION_SECRET_KEY }));
	}

	#[test]
	fn local_defaults() {
		let config = GatewayConfig::from_env(&env(&secrets()), 4000).expect("Config should load.");

		assert_eq!(
			config.root_url().expect("Root URL should build.").as_str(),
			"http://localhost:4000/"
		);
		assert_eq!(config.cookie_domain(), None);
		assert!(!config.is_secure());

		let policy = config.cookie_policy();

		assert_eq!(policy.identity_name, "jwt");
		assert_eq!(policy.profile_name, "profile");
		assert_eq!(policy.max_age, Duration::days(10));
		assert_eq!(policy.session_max_age, Duration::minutes(10));
		assert_eq!(config.exchange_timeout, Duration::seconds(10));
	}

	#[test]
	fn subdomain_deployment() {
		let mut pairs = secrets();

		pairs.extend([
			(SUBDOMAIN_KEY, "login.example.com"),
			(JWT_COOKIE_NAME_KEY, "token"),
			(PROFILE_COOKIE_NAME_KEY, "me"),
			(COOKIE_MAX_AGE_KEY, "60000"),
			(SESSION_TTL_KEY, "120"),
			(EXCHANGE_TIMEOUT_KEY, "2500"),
		]);

		let config = GatewayConfig::from_env(&env(&pairs), 3000).expect("Config should load.");
		let policy = config.cookie_policy();

		assert_eq!(
			config.root_url().expect("Root URL should build.").as_str(),
			"https://login.example.com/"
		);
		assert_eq!(policy.domain.as_deref(), Some(".example.com"));
		assert!(policy.secure);
		assert_eq!(policy.identity_name, "token");
		assert_eq!(policy.profile_name, "me");
		assert_eq!(policy.max_age, Duration::minutes(1));
		assert_eq!(policy.session_max_age, Duration::minutes(2));
		assert_eq!(config.exchange_timeout, Duration::milliseconds(2500));
	}

	#[test]
	fn short_subdomains_keep_cookies_host_only() {
		let mut pairs = secrets();

		pairs.push((SUBDOMAIN_KEY, "example.com"));

		let config = GatewayConfig::from_env(&env(&pairs), 3000).expect("Config should load.");

		assert_eq!(config.cookie_domain(), None);
	}

	#[test]
	fn invalid_numbers_and_names_are_rejected() {
		let mut pairs = secrets();

		pairs.push((COOKIE_MAX_AGE_KEY, "ten days"));

		assert!(matches!(
			GatewayConfig::from_env(&env(&pairs), 3000),
			Err(ConfigError::InvalidValue { key: COOKIE_MAX_AGE_KEY, .. })
		));

		let mut pairs = secrets();

		pairs.push((SESSION_TTL_KEY, "0"));

		assert!(matches!(
			GatewayConfig::from_env(&env(&pairs), 3000),
			Err(ConfigError::InvalidValue { key: SESSION_TTL_KEY, .. })
		));

		let mut pairs = secrets();

		pairs.push((JWT_COOKIE_NAME_KEY, "bad name"));

		assert!(matches!(
			GatewayConfig::from_env(&env(&pairs), 3000),
			Err(ConfigError::InvalidValue { key: JWT_COOKIE_NAME_KEY, .. })
		));
	}

	#[test]
	fn durations_past_ten_years_are_rejected() {
		for key in [COOKIE_MAX_AGE_KEY, SESSION_TTL_KEY, EXCHANGE_TIMEOUT_KEY] {
			let mut pairs = secrets();

			pairs.push((key, "9223372036854775807"));

			let err = GatewayConfig::from_env(&env(&pairs), 3000)
				.expect_err("Overflowing durations must be rejected at startup.");

			assert!(matches!(err, ConfigError::InvalidValue { key: k, .. } if k == key), "{key}");
		}

		let mut pairs = secrets();

		pairs.push((COOKIE_MAX_AGE_KEY, "315360000000"));

		let config = GatewayConfig::from_env(&env(&pairs), 3000).expect("Ten years should load.");

		assert_eq!(config.cookie_max_age, Duration::days(3650));
	}
}
