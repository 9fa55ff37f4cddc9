//! Strongly typed identifiers enforced across the gateway domain.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal, $validate:path) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				$validate($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				$validate($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const STRATEGY_TYPE_MAX_LEN: usize = 64;
const SESSION_ID_MAX_LEN: usize = 128;
/// Path segments the gateway mounts itself; strategies may not shadow them.
const RESERVED_SEGMENTS: &[&str] = &["logout"];

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (strategy, session).
		kind: &'static str,
	},
	/// The identifier contains a character outside its alphabet.
	#[error("{kind} identifier contains the invalid character {found:?}.")]
	InvalidCharacter {
		/// Kind of identifier (strategy, session).
		kind: &'static str,
		/// First offending character.
		found: char,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (strategy, session).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
	/// The identifier collides with a route the gateway owns.
	#[error("{kind} identifier `{value}` is reserved.")]
	Reserved {
		/// Kind of identifier (strategy, session).
		kind: &'static str,
		/// Reserved value that was supplied.
		value: String,
	},
}

def_id! {
	StrategyType,
	"Unique name of an identity-provider strategy; doubles as its URL path segment.",
	"Strategy",
	validate_strategy_type
}
def_id! {
	SessionId,
	"Opaque identifier of a pending login session.",
	"Session",
	validate_session_id
}
impl SessionId {
	const GENERATED_LEN: usize = 32;

	/// Mints a fresh random session identifier.
	pub fn generate() -> Self {
		Self(crate::session::random_string(Self::GENERATED_LEN))
	}
}

fn validate_strategy_type(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if let Some(found) = view
		.chars()
		.find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_')))
	{
		return Err(IdentifierError::InvalidCharacter { kind, found });
	}
	if view.len() > STRATEGY_TYPE_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: STRATEGY_TYPE_MAX_LEN });
	}
	if RESERVED_SEGMENTS.contains(&view) {
		return Err(IdentifierError::Reserved { kind, value: view.to_owned() });
	}

	Ok(())
}

fn validate_session_id(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if let Some(found) = view.chars().find(|c| !c.is_ascii_alphanumeric()) {
		return Err(IdentifierError::InvalidCharacter { kind, found });
	}
	if view.len() > SESSION_ID_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: SESSION_ID_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn strategy_types_are_path_safe() {
		assert!(StrategyType::new("github").is_ok());
		assert!(StrategyType::new("azure-ad_v2").is_ok());
		assert!(StrategyType::new("").is_err());
		assert!(StrategyType::new("GitHub").is_err(), "Upper case must be rejected.");
		assert!(StrategyType::new("git/hub").is_err(), "Slashes would split the route.");
		assert!(StrategyType::new(" github").is_err());

		let err = StrategyType::new("logout").expect_err("Reserved segment must be rejected.");

		assert!(matches!(err, IdentifierError::Reserved { .. }));
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let strategy: StrategyType =
			serde_json::from_str("\"google\"").expect("Strategy should deserialize successfully.");

		assert_eq!(strategy.as_ref(), "google");
		assert!(serde_json::from_str::<StrategyType>("\"with space\"").is_err());
	}

	#[test]
	fn generated_session_ids_validate() {
		let id = SessionId::generate();

		assert_eq!(id.len(), 32);
		assert!(SessionId::new(id.as_ref()).is_ok());
		assert_ne!(id, SessionId::generate());
		assert!(SessionId::new("a".repeat(SESSION_ID_MAX_LEN + 1)).is_err());
		assert!(SessionId::new("abc.def").is_err());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<StrategyType, u8> = HashMap::from_iter([(
			StrategyType::new("github").expect("Strategy used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("github"), Some(&7));
	}
}
