//! Optional observability helpers for refresh attempts.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `token_sentinel.refresh` with the `trigger`,
//!   `stage`, and `role` (leader or follower) fields, plus warning events for failed background
//!   refreshes.
//! - Enable `metrics` to increment the `token_sentinel_refresh_total` counter for every
//!   attempt/success/failure, labeled by `trigger` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// What started a refresh attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshTrigger {
	/// A request path called the coordinator directly.
	Foreground,
	/// The periodic background check found the token stale.
	Background,
}
impl RefreshTrigger {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshTrigger::Foreground => "foreground",
			RefreshTrigger::Background => "background",
		}
	}
}
impl Display for RefreshTrigger {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Role a caller took at the single-flight gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlightRole {
	/// Performed the issuer call.
	Leader,
	/// Joined a refresh already in flight.
	Follower,
}
impl FlightRole {
	/// Returns a stable label suitable for span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlightRole::Leader => "leader",
			FlightRole::Follower => "follower",
		}
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshOutcome {
	/// Entry to the refresh-or-join gate.
	Attempt,
	/// A token was published.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl RefreshOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshOutcome::Attempt => "attempt",
			RefreshOutcome::Success => "success",
			RefreshOutcome::Failure => "failure",
		}
	}
}
impl Display for RefreshOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Reports a failed background refresh; the loop keeps running afterwards.
pub fn report_background_failure(error: &Error) {
	#[cfg(feature = "tracing")]
	{
		::tracing::warn!(
			error = (error as &dyn StdError),
			"Background token refresh failed; retrying on the next tick."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = error;
	}
}
