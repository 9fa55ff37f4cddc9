//! `auth-gateway` binary: load configuration, mount strategies, serve.

// std
use std::{collections::BTreeMap, net::SocketAddr, sync::Arc};
// crates.io
use auth_gateway::{
	codec::JwtCodec,
	config::GatewayConfig,
	cookies::CookieManager,
	flows::Dispatcher,
	http::ReqwestHttpClient,
	provider::StrategyRegistry,
	server,
	session::MemorySessionStore,
};
use clap::Parser;
use color_eyre::{Result, eyre::WrapErr};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
	/// Port to listen on.
	#[arg(env = "LW_PORT", default_value_t = 3000)]
	port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let dotenv = dotenvy::dotenv();

	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	if let Ok(path) = dotenv {
		tracing::debug!(path = %path.display(), "Loaded environment file.");
	}

	let cli = Cli::parse();
	let env = std::env::vars_os()
		.filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
		.collect::<BTreeMap<_, _>>();
	let config = GatewayConfig::from_env(&env, cli.port)
		.inspect_err(|e| tracing::error!(error = %e, "Refusing to start."))
		.wrap_err("invalid configuration")?;
	let root_url = config.root_url()?;

	tracing::info!(%root_url, "Using root URL for callback URLs.");

	let http_client = ReqwestHttpClient::new(config.exchange_timeout)?;
	let registry = StrategyRegistry::load(&env, &root_url, &http_client)?;
	let strategies = registry.types().map(ToString::to_string).collect::<Vec<_>>().join("/");

	tracing::info!(%strategies, "Configured strategies.");

	let dispatcher = Dispatcher::new(
		registry,
		Arc::new(MemorySessionStore::with_ttl(config.session_ttl)),
		Arc::new(JwtCodec::new(&config.jwt_secret, config.cookie_max_age)),
		CookieManager::new(config.cookie_policy(), &config.session_secret),
	);
	let router = server::router(dispatcher);
	let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], config.port))).await?;

	tracing::info!(addr = %listener.local_addr()?, "Listening.");

	server::serve(listener, router).await?;

	Ok(())
}
