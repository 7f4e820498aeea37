//! Time sources used for freshness decisions.
//!
//! The coordinator never calls [`OffsetDateTime::now_utc`] directly; it asks its [`Clock`], so
//! tests can move time forward without sleeping.

// self
use crate::_prelude::*;

/// Represents a clock, which can tell the current time.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Gets the current time according to this clock.
	fn now(&self) -> OffsetDateTime;
}
impl<C> Clock for Arc<C>
where
	C: ?Sized + Clock,
{
	fn now(&self) -> OffsetDateTime {
		(**self).now()
	}
}

/// The system clock in UTC.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// A shared, manually driven clock.
///
/// Clones observe the same instant, so a test can keep one handle while the coordinator owns
/// another.
#[derive(Clone, Debug)]
pub struct ManualClock(Arc<Mutex<OffsetDateTime>>);
impl ManualClock {
	/// Creates a clock frozen at `at`.
	pub fn new(at: OffsetDateTime) -> Self {
		Self(Arc::new(Mutex::new(at)))
	}

	/// Moves the clock to `at`.
	pub fn set(&self, at: OffsetDateTime) {
		*self.0.lock() = at;
	}

	/// Moves the clock forward by `by`.
	pub fn advance(&self, by: Duration) {
		*self.0.lock() += by;
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		*self.0.lock()
	}
}
