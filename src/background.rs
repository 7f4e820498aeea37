//! Periodic freshness checks driven by a spawned task.

// crates.io
use tokio::{
	task::JoinHandle,
	time::{Instant, MissedTickBehavior},
};
// self
use crate::{
	_prelude::*,
	obs::{self, RefreshTrigger},
	refresh::{RefreshContext, RefreshCoordinator},
};

impl RefreshCoordinator {
	/// Spawns the background loop and returns immediately.
	///
	/// The first check happens one `check_interval` after this call. Each tick re-checks
	/// cancellation, then refreshes through the same gate as foreground callers when the token is
	/// stale or missing. Failed refreshes are reported and retried on a later tick; only
	/// `shutdown` (or [`BackgroundRefresh::stop`]) ends the loop.
	///
	/// Must be called from within a Tokio runtime.
	pub fn start_background_refresh(
		self: &Arc<Self>,
		shutdown: CancellationToken,
	) -> BackgroundRefresh {
		let stop = shutdown.child_token();
		let handle = tokio::spawn(run_loop(self.clone(), stop.clone()));

		BackgroundRefresh { stop, handle }
	}
}

/// Handle to a running background refresh loop.
///
/// Dropping the handle detaches the loop; it keeps running until its shutdown token fires.
#[derive(Debug)]
pub struct BackgroundRefresh {
	stop: CancellationToken,
	handle: JoinHandle<()>,
}
impl BackgroundRefresh {
	/// Signals this loop to stop without touching the shutdown token it was started with.
	pub fn stop(&self) {
		self.stop.cancel();
	}

	/// Returns `true` once the loop task has exited.
	pub fn is_finished(&self) -> bool {
		self.handle.is_finished()
	}

	/// Waits for the loop to exit.
	///
	/// Fails only if the task panicked or was aborted by the runtime.
	pub async fn join(self) -> Result<()> {
		self.handle.await.map_err(|e| Error::BackgroundTask { message: e.to_string() })
	}

	/// Stops the loop and waits for it to exit.
	pub async fn shutdown(self) -> Result<()> {
		self.stop();
		self.join().await
	}
}

async fn run_loop(coordinator: Arc<RefreshCoordinator>, cancel: CancellationToken) {
	let config = *coordinator.config();
	let period = config.tick_period();
	let mut ticker = tokio::time::interval_at(Instant::now() + period, period);

	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

	#[cfg(feature = "tracing")]
	tracing::debug!(check_interval = ?period, "Background token refresh started.");

	loop {
		tokio::select! {
			biased;
			_ = cancel.cancelled() => break,
			_ = ticker.tick() => {},
		}

		// Both branches may be ready on the same wakeup.
		if cancel.is_cancelled() {
			break;
		}

		coordinator.metrics().record_background_check();

		if coordinator.is_fresh() {
			#[cfg(feature = "tracing")]
			tracing::trace!("Token is fresh; nothing to do.");

			continue;
		}

		#[cfg(feature = "tracing")]
		tracing::trace!("Token is stale or missing; refreshing.");

		let ctx = RefreshContext::new()
			.with_timeout(config.refresh_timeout)
			.with_cancellation(cancel.clone());

		match coordinator.refresh_or_join(RefreshTrigger::Background, ctx).await {
			Ok(_) => {},
			Err(Error::Cancelled) if cancel.is_cancelled() => break,
			// A joined foreground leader may fail with its own cancellation; for this loop that is
			// just a failed attempt.
			Err(e) => {
				coordinator.metrics().record_background_failure();
				obs::report_background_failure(&e);
			},
		}
	}

	#[cfg(feature = "tracing")]
	tracing::debug!("Background token refresh stopped.");
}
