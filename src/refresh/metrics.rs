// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for refresh activity.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	issuer_calls: AtomicU64,
	joins: AtomicU64,
	successes: AtomicU64,
	failures: AtomicU64,
	background_checks: AtomicU64,
	background_failures: AtomicU64,
}
impl RefreshMetrics {
	/// Returns the number of calls made to the issuer (one per leader).
	pub fn issuer_calls(&self) -> u64 {
		self.issuer_calls.load(Ordering::Relaxed)
	}

	/// Returns the number of callers that joined an in-flight refresh instead of leading one.
	pub fn joins(&self) -> u64 {
		self.joins.load(Ordering::Relaxed)
	}

	/// Returns the number of issuer calls that produced a token.
	pub fn successes(&self) -> u64 {
		self.successes.load(Ordering::Relaxed)
	}

	/// Returns the number of issuer calls that failed or timed out.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	/// Returns the number of background freshness checks performed.
	pub fn background_checks(&self) -> u64 {
		self.background_checks.load(Ordering::Relaxed)
	}

	/// Returns the number of background-triggered refreshes that failed.
	pub fn background_failures(&self) -> u64 {
		self.background_failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_issuer_call(&self) {
		self.issuer_calls.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_join(&self) {
		self.joins.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.successes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_background_check(&self) {
		self.background_checks.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_background_failure(&self) {
		self.background_failures.fetch_add(1, Ordering::Relaxed);
	}
}
