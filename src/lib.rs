//! Keep one bearer token fresh across any number of concurrent callers.
//!
//! A [`RefreshCoordinator`](refresh::RefreshCoordinator) owns a single token slot, refreshes it
//! through an injected [`TokenIssuer`](issuer::TokenIssuer) before it enters the staleness
//! buffer, and collapses concurrent refresh requests into one issuer call via the
//! [`SingleFlight`](singleflight::SingleFlight) gate. A background loop started with
//! [`RefreshCoordinator::start_background_refresh`](refresh::RefreshCoordinator::start_background_refresh)
//! checks freshness on a fixed interval until its shutdown token fires.
//!
//! # Feature Flags
//!
//! - `reqwest` (default): enables [`http::ReqwestTokenIssuer`], a client-credentials issuer.
//! - `tracing` (default): emits `token_sentinel.refresh` spans and background failure events.
//! - `metrics`: increments the `token_sentinel_refresh_total` counter.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod background;
pub mod clock;
pub mod config;
pub mod error;
pub mod freshness;
#[cfg(feature = "reqwest")] pub mod http;
pub mod issuer;
pub mod obs;
pub mod refresh;
pub mod singleflight;
pub mod token;

pub use background::BackgroundRefresh;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RefresherConfig;
pub use error::{ConfigError, Error, IssuanceError, Result};
pub use freshness::FreshnessGuard;
pub use issuer::{IssueFuture, TokenIssuer, issue_fn};
pub use refresh::{RefreshContext, RefreshCoordinator, RefreshMetrics};
pub use token::{Token, TokenSecret};
pub use tokio_util::sync::CancellationToken;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use tokio_util::sync::CancellationToken;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
#[cfg(feature = "reqwest")] pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, serde_json as _};
