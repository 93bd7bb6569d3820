//! Client-side data layer for question-bank browsing: a signed, quota-aware transport, a typed
//! remote gateway, and a cache-first pagination store sitting in front of the question API.
//!
//! Components, leaf first:
//!
//! - [`sign::RequestSigner`] produces timestamp-bound request signatures.
//! - [`transport::AuthenticatedTransport`] attaches bearer tokens and signature headers, enforces
//!   the guest quota, and classifies authorization failures.
//! - [`gateway::QuestionGateway`] maps domain calls onto the remote API and unwraps envelopes.
//! - [`cache::QuestionCacheStore`] owns filter/pagination state plus the list and detail caches.
//!
//! Every stateful component is an ordinary value; nothing lives in process globals, so tests can
//! build as many isolated instances as they need.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod account;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod obs;
pub mod question;
pub mod sign;
pub mod store;
pub mod transport;

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
