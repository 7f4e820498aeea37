//! Refresh-or-join coordination over a single token slot.
//!
//! [`RefreshCoordinator::ensure_fresh`] is the only path that reaches the issuer. Every caller
//! enters the coordinator's [`SingleFlight`] gate: the first one leads and performs exactly one
//! issuer call, the rest join and receive the leader's outcome. The token slot sits behind its
//! own read/write lock, so readers keep getting the previous token while a refresh is in
//! flight, and neither lock is ever held across an `.await`.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	clock::{Clock, SystemClock},
	config::{self, RefresherConfig},
	freshness::FreshnessGuard,
	issuer::TokenIssuer,
	obs::{self, FlightRole, RefreshOutcome, RefreshSpan, RefreshTrigger},
	singleflight::{Flight, SingleFlight},
	token::Token,
};

/// Deadline and cancellation bounds for one refresh call.
#[derive(Clone, Debug, Default)]
pub struct RefreshContext {
	/// Maximum time the call may take; unbounded when `None`.
	pub timeout: Option<Duration>,
	/// Token whose cancellation aborts the call.
	pub cancellation: Option<CancellationToken>,
}
impl RefreshContext {
	/// Creates an unbounded context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Bounds the call by `timeout`.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Aborts the call when `token` is cancelled.
	pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
		self.cancellation = Some(token);

		self
	}

	/// Drives `fut` to completion unless the deadline elapses or the token is cancelled first.
	pub(crate) async fn bound<Fut>(&self, fut: Fut) -> Result<Fut::Output>
	where
		Fut: Future,
	{
		let timed = async {
			match self.timeout {
				Some(timeout) => tokio::time::timeout(config::to_std(timeout), fut)
					.await
					.map_err(|_| Error::DeadlineExceeded { timeout }),
				None => Ok(fut.await),
			}
		};

		match &self.cancellation {
			Some(token) => tokio::select! {
				biased;
				_ = token.cancelled() => Err(Error::Cancelled),
				outcome = timed => outcome,
			},
			None => timed.await,
		}
	}
}

/// Owns the token slot and de-duplicates refreshes across concurrent callers.
///
/// Share it behind an [`Arc`]; the background loop needs one to outlive the spawning call.
pub struct RefreshCoordinator {
	issuer: Arc<dyn TokenIssuer>,
	clock: Arc<dyn Clock>,
	config: RefresherConfig,
	guard: FreshnessGuard,
	slot: RwLock<Option<Token>>,
	flight: SingleFlight<Result<Token>>,
	metrics: RefreshMetrics,
}
impl RefreshCoordinator {
	/// Creates a coordinator with an empty slot, the system clock, and default timings.
	pub fn new<I>(issuer: I) -> Self
	where
		I: 'static + TokenIssuer,
	{
		Self::with_shared_issuer(Arc::new(issuer))
	}

	/// Creates a coordinator around an issuer that is shared with other components.
	pub fn with_shared_issuer(issuer: Arc<dyn TokenIssuer>) -> Self {
		let config = RefresherConfig::default();

		Self {
			issuer,
			clock: Arc::new(SystemClock),
			guard: config.guard(),
			config,
			slot: RwLock::new(None),
			flight: SingleFlight::new(),
			metrics: RefreshMetrics::default(),
		}
	}

	/// Replaces the clock used for freshness checks and issued-token diagnostics.
	pub fn with_clock<C>(mut self, clock: C) -> Self
	where
		C: 'static + Clock,
	{
		self.clock = Arc::new(clock);

		self
	}

	/// Replaces the timing configuration.
	pub fn with_config(mut self, config: RefresherConfig) -> Self {
		self.guard = config.guard();
		self.config = config;

		self
	}

	/// Seeds the slot with an already issued token.
	pub fn with_token(mut self, token: Token) -> Self {
		*self.slot.get_mut() = Some(token);

		self
	}

	/// Returns a snapshot of the current token without waiting on any refresh.
	///
	/// `None` means no refresh has succeeded yet. The token may be stale or expired if the most
	/// recent refreshes failed.
	pub fn current(&self) -> Option<Token> {
		self.slot.read().clone()
	}

	/// Returns `true` if the stored token is outside the staleness buffer right now.
	pub fn is_fresh(&self) -> bool {
		let now = self.clock.now();

		self.guard.is_token_valid(self.slot.read().as_ref(), now)
	}

	/// Returns `true` while a refresh is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.flight.is_in_flight()
	}

	/// Refreshes the token, or joins the refresh already in flight.
	///
	/// Exactly one issuer call happens per in-flight refresh no matter how many callers arrive
	/// while it runs; every caller receives the same outcome. On failure the slot keeps its
	/// previous token and the next call starts a new attempt.
	///
	/// `ctx` bounds the issuer call when this caller leads, and bounds only the wait when it
	/// joins. A leader's deadline or cancellation is shared with everyone who joined it.
	pub async fn ensure_fresh(&self, ctx: RefreshContext) -> Result<Token> {
		self.refresh_or_join(RefreshTrigger::Foreground, ctx).await
	}

	/// Returns the current token if it is fresh, otherwise refreshes via
	/// [`RefreshCoordinator::ensure_fresh`].
	pub async fn fresh_token(&self, ctx: RefreshContext) -> Result<Token> {
		let now = self.clock.now();
		let fresh = self.current().filter(|token| self.guard.is_valid(token.expires_at, now));

		if let Some(token) = fresh {
			return Ok(token);
		}

		self.ensure_fresh(ctx).await
	}

	/// [`RefreshCoordinator::ensure_fresh`] bounded by the configured refresh timeout.
	pub async fn refresh(&self) -> Result<Token> {
		self.ensure_fresh(RefreshContext::new().with_timeout(self.config.refresh_timeout)).await
	}

	/// Counters describing refresh activity so far.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Active timing configuration.
	pub fn config(&self) -> &RefresherConfig {
		&self.config
	}

	pub(crate) async fn refresh_or_join(
		&self,
		trigger: RefreshTrigger,
		ctx: RefreshContext,
	) -> Result<Token> {
		let span = RefreshSpan::new(trigger, "ensure_fresh");

		obs::record_refresh_outcome(trigger, RefreshOutcome::Attempt);

		let result = span
			.instrument(async {
				match self.flight.enter() {
					Flight::Leader(leader) => {
						span.record_role(FlightRole::Leader);

						let outcome = self.lead(&ctx).await;

						leader.finish(outcome.clone());

						outcome
					},
					Flight::Follower(follower) => {
						span.record_role(FlightRole::Follower);
						self.metrics.record_join();

						ctx.bound(follower.wait()).await?.unwrap_or(Err(Error::LeaderAborted))
					},
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_refresh_outcome(trigger, RefreshOutcome::Success),
			Err(_) => obs::record_refresh_outcome(trigger, RefreshOutcome::Failure),
		}

		result
	}

	async fn lead(&self, ctx: &RefreshContext) -> Result<Token> {
		self.metrics.record_issuer_call();

		match ctx.bound(self.issuer.issue()).await.and_then(std::convert::identity) {
			Ok(token) => {
				#[cfg(feature = "tracing")]
				{
					let now = self.clock.now();

					if !self.guard.is_valid(token.expires_at, now) {
						tracing::debug!(
							expires_at = %token.expires_at,
							remaining = %token.remaining_at(now),
							expired = token.is_expired_at(now),
							"Issuer returned a token that is already inside the staleness buffer."
						);
					}
				}

				*self.slot.write() = Some(token.clone());

				self.metrics.record_success();

				Ok(token)
			},
			Err(err) => {
				self.metrics.record_failure();

				Err(err)
			},
		}
	}
}
impl Debug for RefreshCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshCoordinator")
			.field("config", &self.config)
			.field("token", &*self.slot.read())
			.field("refreshing", &self.flight.is_in_flight())
			.field("metrics", &self.metrics)
			.finish()
	}
}
