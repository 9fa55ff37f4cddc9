//! Canonical user profile produced by every strategy's `to_user` mapping.

// self
use crate::_prelude::*;

/// Canonical identity record embedded in the identity token and the profile cookie.
///
/// Only `sub` is required. Optional attributes are omitted from the JSON form when absent, so
/// the profile cookie stays as small as the provider allows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
	/// Stable subject identifier assigned by the provider.
	pub sub: String,
	/// Display name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Email address, when the provider shares one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// Avatar URL.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub avatar: Option<String>,
}
impl UserProfile {
	/// Creates a profile with only the subject set.
	pub fn new(sub: impl Into<String>) -> Self {
		Self { sub: sub.into(), name: None, email: None, avatar: None }
	}

	/// Sets the display name; blank values are ignored.
	pub fn with_name(mut self, name: Option<impl Into<String>>) -> Self {
		self.name = non_blank(name);

		self
	}

	/// Sets the email address; blank values are ignored.
	pub fn with_email(mut self, email: Option<impl Into<String>>) -> Self {
		self.email = non_blank(email);

		self
	}

	/// Sets the avatar URL; blank values are ignored.
	pub fn with_avatar(mut self, avatar: Option<impl Into<String>>) -> Self {
		self.avatar = non_blank(avatar);

		self
	}

	/// Best label for UI: name, then email, then subject.
	pub fn display_name(&self) -> &str {
		self.name.as_deref().or(self.email.as_deref()).unwrap_or(&self.sub)
	}
}

fn non_blank(value: Option<impl Into<String>>) -> Option<String> {
	value.map(Into::into).filter(|v| !v.trim().is_empty())
}
