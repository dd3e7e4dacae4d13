//! Authenticated HTTP gateway for session-cookie backends with single-flight session refresh
//! and one-shot request replay.
//!
//! Callers hand an [`ApiRequest`](http::ApiRequest) to [`Gateway::dispatch`](gateway::Gateway)
//! and receive exactly one outcome. When the backend answers `401`, the gateway joins (or starts)
//! the shared refresh ticket, replays the original request once on success, and otherwise
//! broadcasts [`SessionEvent::Ended`](session::SessionEvent) to every subscriber.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod obs;
pub mod session;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests and demos.

	pub use crate::_prelude::*;

	// self
	use crate::{config::GatewayConfig, gateway::Gateway, http::ReqwestTransport};

	/// Gateway type alias used by reqwest-backed integration tests.
	pub type ReqwestTestGateway = Gateway<ReqwestTransport>;

	/// Builds a gateway rooted at `base_url` with a zero settle delay so tests replay immediately.
	pub fn build_reqwest_test_gateway(base_url: &str) -> (ReqwestTestGateway, ReqwestTransport) {
		let base = Url::parse(base_url).expect("Test base URL should parse.");
		let config = GatewayConfig::builder()
			.base_url(base)
			.settle_delay(Duration::ZERO)
			.build()
			.expect("Test gateway configuration should be valid.");
		let transport =
			ReqwestTransport::new().expect("Failed to build Reqwest transport for tests.");
		let gateway = Gateway::with_transport(config, transport.clone());

		(gateway, transport)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use ::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
