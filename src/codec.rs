//! Token Codec: turns a [`UserProfile`] into a tamper-evident bearer token and back.
//!
//! [`TokenCodec`] is the seam the dispatcher depends on; [`JwtCodec`] is the built-in HS256
//! implementation. Verification fails closed: malformed, expired, or mis-signed input always
//! yields [`CodecError::Invalid`], never a partially trusted profile.

// crates.io
use jsonwebtoken::{
	Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
	errors::{Error as JwtError, ErrorKind as JwtErrorKind},
};
// self
use crate::{
	_prelude::*,
	auth::{IdentityToken, Secret, UserProfile},
};

/// Signing/verification contract consumed by the dispatcher.
pub trait TokenCodec
where
	Self: Send + Sync,
{
	/// Signs `profile` into an opaque token.
	fn sign(&self, profile: &UserProfile) -> Result<IdentityToken, CodecError>;

	/// Verifies `token` and returns the embedded profile.
	fn verify(&self, token: &str) -> Result<UserProfile, CodecError>;
}

/// Failures raised by [`TokenCodec`] implementations.
#[derive(Debug, ThisError)]
pub enum CodecError {
	/// The token could not be produced.
	#[error("Identity token could not be signed.")]
	Sign {
		/// Underlying encoder failure.
		#[source]
		source: JwtError,
	},
	/// The token lifetime pushes its expiry past the representable date range.
	#[error("Identity token expiry is out of range.")]
	ExpiryOutOfRange,
	/// The token did not verify.
	#[error("Identity token is invalid: {reason}.")]
	Invalid {
		/// Short classification (`expired`, `signature`, `malformed`).
		reason: &'static str,
	},
}
impl From<JwtError> for CodecError {
	fn from(e: JwtError) -> Self {
		let reason = match e.kind() {
			JwtErrorKind::ExpiredSignature => "expired",
			JwtErrorKind::InvalidSignature => "signature",
			_ => "malformed",
		};

		Self::Invalid { reason }
	}
}

#[derive(Debug, Serialize, Deserialize)]
struct IdentityClaims {
	#[serde(flatten)]
	profile: UserProfile,
	iat: i64,
	exp: i64,
}

/// HS256 JSON Web Token codec keyed by the gateway's token secret.
#[derive(Clone)]
pub struct JwtCodec {
	encoding: EncodingKey,
	decoding: DecodingKey,
	validation: Validation,
	lifetime: Duration,
}
impl JwtCodec {
	/// Creates a codec whose tokens expire `lifetime` after issuance.
	pub fn new(secret: &Secret, lifetime: Duration) -> Self {
		let key = secret.expose().as_bytes();
		let mut validation = Validation::new(Algorithm::HS256);

		validation.leeway = 0;
		validation.set_required_spec_claims(&["exp"]);

		Self {
			encoding: EncodingKey::from_secret(key),
			decoding: DecodingKey::from_secret(key),
			validation,
			lifetime,
		}
	}

	/// Signs `profile` as if it were issued at `issued_at`.
	pub fn sign_at(
		&self,
		profile: &UserProfile,
		issued_at: OffsetDateTime,
	) -> Result<IdentityToken, CodecError> {
		let expires_at =
			issued_at.checked_add(self.lifetime).ok_or(CodecError::ExpiryOutOfRange)?;
		let claims = IdentityClaims {
			profile: profile.clone(),
			iat: issued_at.unix_timestamp(),
			exp: expires_at.unix_timestamp(),
		};
		let value = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
			.map_err(|source| CodecError::Sign { source })?;

		Ok(IdentityToken::new(value, expires_at))
	}
}
impl TokenCodec for JwtCodec {
	fn sign(&self, profile: &UserProfile) -> Result<IdentityToken, CodecError> {
		self.sign_at(profile, OffsetDateTime::now_utc())
	}

	fn verify(&self, token: &str) -> Result<UserProfile, CodecError> {
		let data = decode::<IdentityClaims>(token, &self.decoding, &self.validation)?;

		Ok(data.claims.profile)
	}
}
impl Debug for JwtCodec {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("JwtCodec")
			.field("algorithm", &"HS256")
			.field("lifetime", &self.lifetime)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn codec(secret: &str) -> JwtCodec {
		JwtCodec::new(&Secret::new(secret), Duration::days(10))
	}

	fn profile() -> UserProfile {
		UserProfile::new("u1").with_name(Some("Ann")).with_avatar(Some("https://a.example/ann"))
	}

	#[test]
	fn signed_profiles_verify_with_the_same_secret() {
		let codec = codec("token-secret");
		let token = codec.sign(&profile()).expect("Signing should succeed.");

		assert_eq!(codec.verify(token.expose()).expect("Token should verify."), profile());
		assert!(token.expires_at > OffsetDateTime::now_utc() + Duration::days(9));
	}

	#[test]
	fn foreign_secrets_and_mutations_are_rejected() {
		let token = codec("token-secret").sign(&profile()).expect("Signing should succeed.");
		let err = codec("other-secret")
			.verify(token.expose())
			.expect_err("Foreign secret must not verify.");

		assert!(matches!(err, CodecError::Invalid { reason: "signature" }));

		let other = codec("token-secret")
			.sign(&UserProfile::new("admin"))
			.expect("Signing should succeed.");
		let original = token.expose().split('.').collect::<Vec<_>>();
		let forged_payload = other.expose().split('.').nth(1).expect("JWT should have a payload.");
		let tampered = format!("{}.{}.{}", original[0], forged_payload, original[2]);

		assert!(codec("token-secret").verify(&tampered).is_err());
		assert!(codec("token-secret").verify("not-a-token").is_err());
		assert!(codec("token-secret").verify("").is_err());
	}

	#[test]
	fn expired_tokens_fail_closed() {
		let codec = codec("token-secret");
		let token = codec
			.sign_at(&profile(), OffsetDateTime::now_utc() - Duration::days(11))
			.expect("Signing should succeed.");
		let err = codec.verify(token.expose()).expect_err("Expired token must not verify.");

		assert!(matches!(err, CodecError::Invalid { reason: "expired" }));
	}

	#[test]
	fn unrepresentable_expiry_is_an_error() {
		let codec = JwtCodec::new(&Secret::new("token-secret"), Duration::MAX);
		let err = codec.sign(&profile()).expect_err("Overflowing expiry must not sign.");

		assert!(matches!(err, CodecError::ExpiryOutOfRange));
	}

	#[test]
	fn debug_output_hides_keys() {
		let rendered = format!("{:?}", codec("token-secret"));

		assert!(!rendered.contains("token-secret"));
	}
}
