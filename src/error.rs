//! Crate-wide error types shared by the coordinator, the background loop, and issuers.
//!
//! Every error is [`Clone`] because a single refresh outcome is fanned out to every caller that
//! joined the in-flight attempt.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Shareable error source kept behind an [`Arc`] so outcomes stay cloneable.
pub type SharedError = Arc<dyn StdError + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Clone, Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The issuer failed to produce a token.
	#[error(transparent)]
	Issuance(#[from] IssuanceError),

	/// The refresh attempt did not finish before its deadline.
	#[error("Token refresh did not complete within {timeout}.")]
	DeadlineExceeded {
		/// Deadline that elapsed.
		timeout: Duration,
	},
	/// The caller's cancellation token fired before an outcome was available.
	#[error("Token refresh was cancelled.")]
	Cancelled,
	/// The refresh leader was dropped before it published an outcome.
	#[error("Token refresh leader was dropped before publishing an outcome.")]
	LeaderAborted,
	/// The background refresh task terminated abnormally.
	#[error("Background refresh task failed: {message}.")]
	BackgroundTask {
		/// Description of the task failure.
		message: String,
	},
}
impl Error {
	/// Returns `true` for failures that belong to the issuance category, including elapsed
	/// deadlines.
	pub fn is_issuance_failure(&self) -> bool {
		matches!(self, Self::Issuance(_) | Self::DeadlineExceeded { .. })
	}

	/// Returns `true` if the refresh deadline elapsed.
	pub fn is_deadline_exceeded(&self) -> bool {
		matches!(self, Self::DeadlineExceeded { .. })
	}

	/// Returns `true` if the caller cancelled the attempt.
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Cancelled)
	}
}

/// Configuration and validation failures.
#[derive(Clone, Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: SharedError,
	},
	/// A configured request header is not valid HTTP.
	#[error("Header `{name}` is invalid.")]
	InvalidHeader {
		/// Offending header name.
		name: String,
	},
	/// An expiry instant cannot be represented.
	#[error("Expiry {millis} ms is outside the supported range.")]
	ExpiryOutOfRange {
		/// Raw Unix milliseconds that were rejected.
		millis: i128,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Arc::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures reported by a [`TokenIssuer`](crate::issuer::TokenIssuer).
#[derive(Clone, Debug, ThisError)]
pub enum IssuanceError {
	/// Network failure (DNS, TCP, TLS) while calling the issuer.
	#[error("Network error occurred while calling the token issuer.")]
	Transport {
		/// Transport-specific failure.
		#[source]
		source: SharedError,
	},
	/// The issuer answered but refused to issue a token.
	#[error("Token issuer rejected the request: {reason}.")]
	Rejected {
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Issuer-supplied reason string.
		reason: String,
	},
	/// The issuer answered with a body that does not describe a usable token.
	#[error("Token issuer returned a malformed response: {reason}.")]
	MalformedResponse {
		/// Description of the parsing or validation failure.
		reason: String,
	},
	/// Issuer-specific failure that fits none of the other categories.
	#[error("Token issuer failed: {source}.")]
	Other {
		/// Issuer-specific failure.
		#[source]
		source: SharedError,
	},
}
impl IssuanceError {
	/// Wraps a transport failure.
	pub fn transport(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Transport { source: Arc::new(src) }
	}

	/// Wraps an arbitrary issuer failure.
	pub fn other(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Other { source: Arc::new(src) }
	}

	/// Builds a rejection with the provided status and reason.
	pub fn rejected(status: Option<u16>, reason: impl Into<String>) -> Self {
		Self::Rejected { status, reason: reason.into() }
	}

	/// Builds a malformed-response failure.
	pub fn malformed(reason: impl Into<String>) -> Self {
		Self::MalformedResponse { reason: reason.into() }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for IssuanceError {
	fn from(e: reqwest::Error) -> Self {
		Self::transport(e)
	}
}
