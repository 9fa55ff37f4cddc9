//! Minimal authentication gateway: send the browser to a pluggable OAuth 2.0 identity provider,
//! then turn the callback into a signed identity cookie and redirect home.
//!
//! The crate is split into a transport-free core ([`flows::Dispatcher`] plus the registry,
//! session, codec, and cookie collaborators it drives) and a thin axum adapter in [`server`]
//! that turns dispatcher outcomes into HTTP responses.

#![deny(clippy::all)]
#![warn(missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod codec;
pub mod config;
pub mod cookies;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod provider;
pub mod server;
pub mod session;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use url;
// Only the binary target uses these.
use {clap as _, color_eyre as _, dotenvy as _, tracing_subscriber as _};
#[cfg(test)] use {httpmock as _, tower as _};
