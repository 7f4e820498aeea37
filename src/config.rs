//! Tunables for the coordinator and its background loop.

// self
use crate::{_prelude::*, freshness::FreshnessGuard};

/// Timing configuration for a [`RefreshCoordinator`](crate::refresh::RefreshCoordinator).
///
/// The check interval is much finer than the staleness buffer so staleness is noticed quickly
/// while each check stays a single read-locked comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefresherConfig {
	/// Margin before expiry at which a token counts as stale.
	pub staleness_buffer: Duration,
	/// Period between background freshness checks.
	pub check_interval: Duration,
	/// Deadline applied to each background-triggered refresh and to
	/// [`RefreshCoordinator::refresh`](crate::refresh::RefreshCoordinator::refresh).
	pub refresh_timeout: Duration,
}
impl RefresherConfig {
	/// Default staleness buffer (15 minutes).
	pub const DEFAULT_STALENESS_BUFFER: Duration = crate::freshness::DEFAULT_STALENESS_BUFFER;
	/// Default background check interval (1 minute).
	pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::minutes(1);
	/// Default refresh deadline (30 seconds).
	pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::seconds(30);
	const MIN_CHECK_INTERVAL: Duration = Duration::milliseconds(1);

	/// Overrides the staleness buffer.
	pub fn with_staleness_buffer(mut self, buffer: Duration) -> Self {
		self.staleness_buffer = buffer;

		self
	}

	/// Overrides the background check interval.
	pub fn with_check_interval(mut self, interval: Duration) -> Self {
		self.check_interval = interval;

		self
	}

	/// Overrides the refresh deadline.
	pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
		self.refresh_timeout = timeout;

		self
	}

	/// Builds the freshness guard for the configured buffer.
	pub fn guard(&self) -> FreshnessGuard {
		FreshnessGuard::new(self.staleness_buffer)
	}

	/// Check interval as a timer period, never shorter than one millisecond.
	pub(crate) fn tick_period(&self) -> std::time::Duration {
		to_std(self.check_interval.max(Self::MIN_CHECK_INTERVAL))
	}
}
impl Default for RefresherConfig {
	fn default() -> Self {
		Self {
			staleness_buffer: Self::DEFAULT_STALENESS_BUFFER,
			check_interval: Self::DEFAULT_CHECK_INTERVAL,
			refresh_timeout: Self::DEFAULT_REFRESH_TIMEOUT,
		}
	}
}

/// Converts a signed duration into a timer duration; negative values become zero.
pub(crate) fn to_std(duration: Duration) -> std::time::Duration {
	if duration.is_negative() { std::time::Duration::ZERO } else { duration.unsigned_abs() }
}
