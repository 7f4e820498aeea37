//! Pure freshness decisions for a token expiry.
//!
//! A token is only worth handing out if it will outlive the request that carries it, so a
//! token inside the staleness buffer counts as stale even though the issuer would still accept
//! it.

// self
use crate::{
	_prelude::*,
	token::{self, Token},
};

/// Default safety margin before expiry.
pub const DEFAULT_STALENESS_BUFFER: Duration = Duration::minutes(15);

/// Returns `true` if `expires_at` is more than [`DEFAULT_STALENESS_BUFFER`] ahead of `now`.
pub fn is_valid(expires_at: OffsetDateTime, now: OffsetDateTime) -> bool {
	FreshnessGuard::default().is_valid(expires_at, now)
}

/// Decides whether an expiry still leaves enough runway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshnessGuard {
	buffer: Duration,
}
impl FreshnessGuard {
	/// Creates a guard with the provided buffer; negative buffers clamp to zero.
	pub const fn new(buffer: Duration) -> Self {
		Self { buffer: if buffer.is_negative() { Duration::ZERO } else { buffer } }
	}

	/// Returns the configured buffer.
	pub const fn buffer(&self) -> Duration {
		self.buffer
	}

	/// Returns `true` iff more than the buffer remains between `now` and `expires_at`.
	///
	/// Both instants are truncated to whole Unix milliseconds before comparing, so the result
	/// matches [`FreshnessGuard::is_valid_millis`] for the same inputs.
	pub fn is_valid(&self, expires_at: OffsetDateTime, now: OffsetDateTime) -> bool {
		self.remaining_millis_valid(token::unix_millis(expires_at) - token::unix_millis(now))
	}

	/// Millisecond form of [`FreshnessGuard::is_valid`].
	pub fn is_valid_millis(&self, expires_at_ms: i64, now_ms: i64) -> bool {
		self.remaining_millis_valid(i128::from(expires_at_ms) - i128::from(now_ms))
	}

	/// Checks an optional token; an unset slot is never valid.
	pub fn is_token_valid(&self, token: Option<&Token>, now: OffsetDateTime) -> bool {
		token.is_some_and(|token| self.is_valid(token.expires_at, now))
	}

	fn remaining_millis_valid(&self, remaining_ms: i128) -> bool {
		remaining_ms > self.buffer.whole_milliseconds()
	}
}
impl Default for FreshnessGuard {
	fn default() -> Self {
		Self::new(DEFAULT_STALENESS_BUFFER)
	}
}
