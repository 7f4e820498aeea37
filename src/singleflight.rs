//! Leader/follower de-duplication of a single in-flight operation.
//!
//! The first caller to [`SingleFlight::enter`] while the gate is idle becomes the [`Leader`]
//! and performs the work. Everyone arriving before the leader finishes becomes a [`Follower`]
//! and receives a clone of the leader's outcome. The gate keeps its own lock, so the data the
//! work produces can live behind a different one.

// crates.io
use tokio::sync::oneshot;
// self
use crate::_prelude::*;

/// Gate that lets at most one operation run at a time and shares its outcome with joiners.
#[derive(Debug)]
pub struct SingleFlight<T> {
	state: Mutex<FlightState<T>>,
}
impl<T> SingleFlight<T>
where
	T: Clone,
{
	/// Creates an idle gate.
	pub fn new() -> Self {
		Self { state: Mutex::new(FlightState { in_flight: false, waiters: Vec::new() }) }
	}

	/// Becomes the leader when idle, otherwise joins the in-flight operation.
	pub fn enter(&self) -> Flight<'_, T> {
		let mut state = self.state.lock();

		if state.in_flight {
			let (tx, rx) = oneshot::channel();

			state.waiters.push(tx);

			Flight::Follower(Follower { rx })
		} else {
			state.in_flight = true;

			Flight::Leader(Leader { flight: self, finished: false })
		}
	}

	/// Runs `work` as the leader, or waits for the current leader's outcome.
	///
	/// Returns `None` only when the leader was dropped before finishing.
	pub async fn run<F, Fut>(&self, work: F) -> Option<T>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = T>,
	{
		match self.enter() {
			Flight::Leader(leader) => {
				let value = work().await;

				leader.finish(value.clone());

				Some(value)
			},
			Flight::Follower(follower) => follower.wait().await,
		}
	}

	/// Returns `true` while a leader holds the gate.
	pub fn is_in_flight(&self) -> bool {
		self.state.lock().in_flight
	}

	/// Number of followers waiting on the current leader.
	pub fn waiter_count(&self) -> usize {
		self.state.lock().waiters.len()
	}

	fn release(&self, value: Option<T>) {
		let mut state = self.state.lock();
		let waiters = std::mem::take(&mut state.waiters);

		// Followers that gave up have dropped their receivers; those sends fail harmlessly.
		if let Some(value) = value {
			for tx in waiters {
				let _ = tx.send(value.clone());
			}
		}

		state.in_flight = false;
	}
}
impl<T> Default for SingleFlight<T>
where
	T: Clone,
{
	fn default() -> Self {
		Self::new()
	}
}

#[derive(Debug)]
struct FlightState<T> {
	in_flight: bool,
	waiters: Vec<oneshot::Sender<T>>,
}

/// Role assigned by [`SingleFlight::enter`].
#[derive(Debug)]
pub enum Flight<'a, T>
where
	T: Clone,
{
	/// The caller must perform the work and call [`Leader::finish`].
	Leader(Leader<'a, T>),
	/// The caller must wait for the leader's outcome.
	Follower(Follower<T>),
}

/// Exclusive right to perform the in-flight operation.
///
/// Dropping a leader without calling [`Leader::finish`] reopens the gate and wakes every
/// follower with `None`.
#[derive(Debug)]
#[must_use = "a leader that is dropped without finishing releases its followers empty-handed"]
pub struct Leader<'a, T>
where
	T: Clone,
{
	flight: &'a SingleFlight<T>,
	finished: bool,
}
impl<T> Leader<'_, T>
where
	T: Clone,
{
	/// Publishes `value` to every follower in join order and reopens the gate.
	pub fn finish(mut self, value: T) {
		self.finished = true;
		self.flight.release(Some(value));
	}
}
impl<T> Drop for Leader<'_, T>
where
	T: Clone,
{
	fn drop(&mut self) {
		if !self.finished {
			self.flight.release(None);
		}
	}
}

/// Pending receipt of the leader's outcome.
#[derive(Debug)]
pub struct Follower<T> {
	rx: oneshot::Receiver<T>,
}
impl<T> Follower<T> {
	/// Waits for the leader; `None` if it was dropped before finishing.
	pub async fn wait(self) -> Option<T> {
		self.rx.await.ok()
	}
}
