//! Strategy Registry: the ordered, read-only set of configured strategies.

// self
use crate::{
	_prelude::*,
	auth::{Secret, StrategyType},
	error::ConfigError,
	http::ReqwestHttpClient,
	provider::{BuiltinProvider, OAuthStrategy, Strategy},
};

/// Ordered map from strategy type to strategy, built once at startup.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
	strategies: Vec<Arc<dyn Strategy>>,
}
impl StrategyRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds one strategy per built-in provider whose credentials are present in `env`.
	///
	/// Providers with a missing or blank client id or secret are skipped silently. Strategies
	/// keep declaration order.
	pub fn load(
		env: &BTreeMap<String, String>,
		root_url: &Url,
		http_client: &ReqwestHttpClient,
	) -> Result<Self, ConfigError> {
		let mut registry = Self::new();

		for provider in BuiltinProvider::ALL {
			let Some((client_id, client_secret)) = credentials(env, provider) else {
				tracing::debug!(strategy = provider.as_str(), "Provider credentials absent.");

				continue;
			};
			let descriptor = provider.descriptor()?;
			let callback_url = callback_url(root_url, &descriptor.id)?;
			let strategy = OAuthStrategy::new(
				descriptor,
				client_id,
				client_secret,
				callback_url,
				http_client.clone(),
				provider.mapper(),
			)?;

			registry.register(Arc::new(strategy))?;
		}

		Ok(registry)
	}

	/// Appends `strategy`; fails when its type is already registered.
	pub fn register(&mut self, strategy: Arc<dyn Strategy>) -> Result<(), ConfigError> {
		if self.get(strategy.strategy_type()).is_some() {
			return Err(ConfigError::DuplicateStrategy {
				strategy: strategy.strategy_type().to_string(),
			});
		}

		self.strategies.push(strategy);

		Ok(())
	}

	/// Looks up a strategy by its type.
	pub fn get(&self, strategy_type: &str) -> Option<&Arc<dyn Strategy>> {
		self.strategies.iter().find(|strategy| strategy.strategy_type().as_ref() == strategy_type)
	}

	/// Registered types in registration order.
	pub fn types(&self) -> impl Iterator<Item = &StrategyType> {
		self.strategies.iter().map(|strategy| strategy.strategy_type())
	}

	/// Number of registered strategies.
	pub fn len(&self) -> usize {
		self.strategies.len()
	}

	/// Whether no strategy is registered.
	pub fn is_empty(&self) -> bool {
		self.strategies.is_empty()
	}
}
impl Debug for StrategyRegistry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_list().entries(self.types()).finish()
	}
}

/// Callback URL for `strategy`: `{root}/{type}/callback`.
pub fn callback_url(root_url: &Url, strategy: &StrategyType) -> Result<Url, ConfigError> {
	Ok(root_url.join(&format!("/{strategy}/callback"))?)
}

fn credentials(
	env: &BTreeMap<String, String>,
	provider: BuiltinProvider,
) -> Option<(String, Secret)> {
	let client_id =
		env.get(&provider.client_id_key()).map(|v| v.trim()).filter(|v| !v.is_empty())?;
	let client_secret = Secret::new(env.get(&provider.client_secret_key())?.trim());

	if client_secret.is_blank() {
		return None;
	}

	Some((client_id.to_owned(), client_secret))
}
