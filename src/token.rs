//! Immutable token value object.

pub mod secret;

pub use secret::TokenSecret;

// self
use crate::{_prelude::*, error::ConfigError};

const NANOS_PER_MILLI: i128 = 1_000_000;

/// Bearer token plus its absolute expiry.
///
/// Tokens are never mutated; a refresh replaces the whole value. The expiry is kept at
/// millisecond resolution, and anything finer is truncated on construction.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
	/// Bearer value; callers must avoid logging it.
	pub value: TokenSecret,
	/// Expiry instant at millisecond resolution.
	pub expires_at: OffsetDateTime,
}
impl Token {
	/// Creates a token that expires at `expires_at`.
	pub fn new(value: impl Into<String>, expires_at: OffsetDateTime) -> Self {
		let sub_milli = i64::from(expires_at.nanosecond() % 1_000_000);

		Self {
			value: TokenSecret::new(value),
			expires_at: expires_at - Duration::nanoseconds(sub_milli),
		}
	}

	/// Creates a token whose expiry is given in Unix milliseconds.
	pub fn from_unix_millis(value: impl Into<String>, millis: i64) -> Result<Self> {
		let expires_at = OffsetDateTime::from_unix_timestamp_nanos(
			i128::from(millis) * NANOS_PER_MILLI,
		)
		.map_err(|_| ConfigError::ExpiryOutOfRange { millis: i128::from(millis) })?;

		Ok(Self { value: TokenSecret::new(value), expires_at })
	}

	/// Returns the expiry as Unix milliseconds.
	pub fn expires_at_unix_millis(&self) -> i128 {
		unix_millis(self.expires_at)
	}

	/// Time left before the token expires at `now` (negative once expired).
	pub fn remaining_at(&self, now: OffsetDateTime) -> Duration {
		self.expires_at - now
	}

	/// Returns `true` once `now` has reached the expiry instant.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		now >= self.expires_at
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("value", &self.value)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Whole Unix milliseconds of `at`, rounded toward negative infinity.
pub(crate) fn unix_millis(at: OffsetDateTime) -> i128 {
	at.unix_timestamp_nanos().div_euclid(NANOS_PER_MILLI)
}
