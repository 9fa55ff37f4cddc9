//! Built-in identity providers, in the order they are registered.

// self
use crate::{
	_prelude::*,
	auth::{StrategyType, UserProfile},
	error::{ConfigError, MappingError},
	provider::{
		ClientAuthMethod, ProfileMapper, ProviderDescriptor, ProviderProfile, ProviderQuirks,
	},
};

/// Providers the gateway knows how to configure from the environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltinProvider {
	/// GitHub OAuth app.
	GitHub,
	/// Google OpenID Connect client.
	Google,
	/// Facebook login.
	Facebook,
}
impl BuiltinProvider {
	/// Declaration order; this is also the route mount order.
	pub const ALL: [Self; 3] = [Self::GitHub, Self::Google, Self::Facebook];

	/// Strategy type the provider is mounted under.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::GitHub => "github",
			Self::Google => "google",
			Self::Facebook => "facebook",
		}
	}

	/// Environment key holding the client id, e.g. `LW_GITHUB_CLIENTID`.
	pub fn client_id_key(self) -> String {
		format!("LW_{}_CLIENTID", self.env_segment())
	}

	/// Environment key holding the client secret, e.g. `LW_GITHUB_CLIENTSECRET`.
	pub fn client_secret_key(self) -> String {
		format!("LW_{}_CLIENTSECRET", self.env_segment())
	}

	/// Descriptor with the provider's public endpoints.
	pub fn descriptor(self) -> Result<ProviderDescriptor, ConfigError> {
		let id = StrategyType::new(self.as_str())?;
		let builder = match self {
			Self::GitHub => ProviderDescriptor::builder(id)
				.authorization_endpoint(Url::parse("https://github.com/login/oauth/authorize")?)
				.token_endpoint(Url::parse("https://github.com/login/oauth/access_token")?)
				.profile_endpoint(Url::parse("https://api.github.com/user")?)
				.scopes(["read:user", "user:email"]),
			Self::Google => ProviderDescriptor::builder(id)
				.authorization_endpoint(Url::parse("https://accounts.google.com/o/oauth2/v2/auth")?)
				.token_endpoint(Url::parse("https://oauth2.googleapis.com/token")?)
				.profile_endpoint(Url::parse("https://openidconnect.googleapis.com/v1/userinfo")?)
				.scopes(["openid", "email", "profile"]),
			Self::Facebook => ProviderDescriptor::builder(id)
				.authorization_endpoint(Url::parse("https://www.facebook.com/v19.0/dialog/oauth")?)
				.token_endpoint(Url::parse("https://graph.facebook.com/v19.0/oauth/access_token")?)
				.profile_endpoint(Url::parse(
					"https://graph.facebook.com/v19.0/me?fields=id,name,email,picture",
				)?)
				.scopes(["email", "public_profile"])
				.quirks(ProviderQuirks { scope_delimiter: ',', ..Default::default() }),
		};

		Ok(builder.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost).build()?)
	}

	/// Mapper from the provider's profile document into a [`UserProfile`].
	pub fn mapper(self) -> ProfileMapper {
		match self {
			Self::GitHub => github_user,
			Self::Google => google_user,
			Self::Facebook => facebook_user,
		}
	}

	fn env_segment(self) -> &'static str {
		match self {
			Self::GitHub => "GITHUB",
			Self::Google => "GOOGLE",
			Self::Facebook => "FACEBOOK",
		}
	}
}
impl Display for BuiltinProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[derive(Deserialize)]
struct GitHubUser {
	id: u64,
	login: String,
	name: Option<String>,
	email: Option<String>,
	avatar_url: Option<String>,
}

#[derive(Deserialize)]
struct GoogleUser {
	sub: String,
	name: Option<String>,
	email: Option<String>,
	picture: Option<String>,
}

#[derive(Deserialize)]
struct FacebookUser {
	id: String,
	name: Option<String>,
	email: Option<String>,
	picture: Option<FacebookPicture>,
}

#[derive(Deserialize)]
struct FacebookPicture {
	data: FacebookPictureData,
}

#[derive(Deserialize)]
struct FacebookPictureData {
	url: Option<String>,
}

/// GitHub mapper; `ProfileMapper`-compatible.
pub fn github_user(profile: &ProviderProfile) -> Result<UserProfile, MappingError> {
	let user = profile.deserialize::<GitHubUser>()?;
	let name = user.name.filter(|name| !name.trim().is_empty()).unwrap_or(user.login);

	Ok(UserProfile::new(user.id.to_string())
		.with_name(Some(name))
		.with_email(user.email)
		.with_avatar(user.avatar_url))
}

/// Google mapper; `ProfileMapper`-compatible.
pub fn google_user(profile: &ProviderProfile) -> Result<UserProfile, MappingError> {
	let user = profile.deserialize::<GoogleUser>()?;

	Ok(UserProfile::new(non_empty(user.sub, "sub")?)
		.with_name(user.name)
		.with_email(user.email)
		.with_avatar(user.picture))
}

/// Facebook mapper; `ProfileMapper`-compatible.
pub fn facebook_user(profile: &ProviderProfile) -> Result<UserProfile, MappingError> {
	let user = profile.deserialize::<FacebookUser>()?;

	Ok(UserProfile::new(non_empty(user.id, "id")?)
		.with_name(user.name)
		.with_email(user.email)
		.with_avatar(user.picture.and_then(|picture| picture.data.url)))
}

fn non_empty(value: String, field: &'static str) -> Result<String, MappingError> {
	if value.trim().is_empty() { Err(MappingError::MissingField { field }) } else { Ok(value) }
}
