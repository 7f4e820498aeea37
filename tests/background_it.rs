mod common;

// std
use std::{sync::Arc, time::Duration as StdDuration};
// crates.io
use time::Duration;
// self
use common::{GatedIssuer, NOW, token};
use token_sentinel::{
	CancellationToken, Clock, ManualClock, RefreshContext, RefreshCoordinator, RefresherConfig, Token,
	TokenIssuer, issue_fn,
};

const TICK: StdDuration = StdDuration::from_secs(60);

#[tokio::test(start_paused = true)]
async fn proactive_refresh_follows_the_simulated_clock() {
	let clock = ManualClock::new(NOW);
	let issuer_clock = clock.clone();
	let coordinator = Arc::new(
		RefreshCoordinator::new(issue_fn(move || {
			let expires_at = issuer_clock.now() + Duration::hours(1);

			async move { Ok(Token::new("access-new", expires_at)) }
		}))
		.with_clock(clock.clone())
		.with_token(token("access-old", Duration::minutes(20))),
	);
	let handle = coordinator.start_background_refresh(CancellationToken::new());

	// 20 minutes left: outside the 15 minute buffer.
	tokio::time::sleep(TICK + StdDuration::from_secs(1)).await;

	assert_eq!(coordinator.metrics().background_checks(), 1);
	assert_eq!(coordinator.metrics().issuer_calls(), 0);
	assert_eq!(coordinator.current(), Some(token("access-old", Duration::minutes(20))));

	// 10 minutes left: inside the buffer.
	clock.advance(Duration::minutes(10));
	tokio::time::sleep(TICK).await;

	let current = coordinator.current().expect("Refreshed token should be stored.");

	assert_eq!(coordinator.metrics().issuer_calls(), 1);
	assert_eq!(current.value.expose(), "access-new");
	assert_eq!(current.expires_at, NOW + Duration::minutes(10) + Duration::hours(1));
	assert!(coordinator.is_fresh());

	// Fresh again, so further ticks leave the issuer alone.
	tokio::time::sleep(TICK * 3).await;

	assert_eq!(coordinator.metrics().issuer_calls(), 1);

	handle.shutdown().await.expect("Loop should exit cleanly.");
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_the_loop_within_one_tick() {
	let coordinator = Arc::new(
		RefreshCoordinator::new(issue_fn(|| async {
			Ok(Token::new("access", NOW + Duration::hours(1)))
		}))
		.with_clock(ManualClock::new(NOW)),
	);
	let shutdown = CancellationToken::new();
	let handle = coordinator.start_background_refresh(shutdown.clone());

	tokio::time::sleep(TICK + TICK / 2).await;
	shutdown.cancel();

	tokio::time::timeout(TICK, handle.join())
		.await
		.expect("Loop should stop within one tick.")
		.expect("Loop should exit cleanly.");

	let checks = coordinator.metrics().background_checks();

	tokio::time::sleep(TICK * 3).await;

	assert_eq!(coordinator.metrics().background_checks(), checks);
}

#[tokio::test(start_paused = true)]
async fn cancellation_aborts_an_in_flight_background_refresh() {
	let issuer = GatedIssuer::new(vec![Ok(token("access", Duration::hours(1)))]);
	let issuer_handle: Arc<dyn TokenIssuer> = Arc::new(issuer.clone());
	let coordinator = Arc::new(
		RefreshCoordinator::with_shared_issuer(issuer_handle).with_clock(ManualClock::new(NOW)),
	);
	let shutdown = CancellationToken::new();
	let handle = coordinator.start_background_refresh(shutdown.clone());

	issuer.wait_for_calls(1).await;

	assert!(coordinator.is_refreshing());

	shutdown.cancel();
	handle.join().await.expect("Loop should exit cleanly.");

	assert!(!coordinator.is_refreshing());
	assert_eq!(coordinator.current(), None);
	assert_eq!(coordinator.metrics().background_failures(), 0);
}

#[tokio::test(start_paused = true)]
async fn slow_issuer_hits_the_refresh_deadline_and_the_loop_continues() {
	let coordinator = Arc::new(
		RefreshCoordinator::new(issue_fn(|| async {
			tokio::time::sleep(StdDuration::from_secs(120)).await;

			Ok(Token::new("access-late", NOW + Duration::hours(1)))
		}))
		.with_clock(ManualClock::new(NOW))
		.with_config(RefresherConfig::default().with_refresh_timeout(Duration::seconds(5))),
	);
	let handle = coordinator.start_background_refresh(CancellationToken::new());

	tokio::time::sleep(TICK + StdDuration::from_secs(10)).await;

	assert_eq!(coordinator.metrics().issuer_calls(), 1);
	assert_eq!(coordinator.metrics().background_failures(), 1);
	assert!(!handle.is_finished());

	tokio::time::sleep(TICK).await;

	assert_eq!(coordinator.metrics().issuer_calls(), 2);
	assert_eq!(coordinator.metrics().background_failures(), 2);
	assert_eq!(coordinator.current(), None);

	handle.shutdown().await.expect("Loop should exit cleanly.");
}

#[tokio::test(start_paused = true)]
async fn foreground_caller_joins_a_background_refresh() {
	let fresh = token("access-new", Duration::hours(1));
	let issuer = GatedIssuer::new(vec![Ok(fresh.clone())]);
	let issuer_handle: Arc<dyn TokenIssuer> = Arc::new(issuer.clone());
	let coordinator = Arc::new(
		RefreshCoordinator::with_shared_issuer(issuer_handle).with_clock(ManualClock::new(NOW)),
	);
	let handle = coordinator.start_background_refresh(CancellationToken::new());

	issuer.wait_for_calls(1).await;

	let foreground = {
		let coordinator = coordinator.clone();

		tokio::spawn(async move { coordinator.ensure_fresh(RefreshContext::new()).await })
	};

	while coordinator.metrics().joins() == 0 {
		tokio::task::yield_now().await;
	}

	issuer.release(1);

	let token = foreground
		.await
		.expect("Foreground task should not panic.")
		.expect("Foreground caller should share the background outcome.");

	assert_eq!(token, fresh);
	assert_eq!(issuer.calls(), 1);

	handle.shutdown().await.expect("Loop should exit cleanly.");
}

#[tokio::test(start_paused = true)]
async fn foreground_cancellation_does_not_stop_the_loop() {
	let fresh = token("access-new", Duration::hours(1));
	let issuer = GatedIssuer::new(vec![Ok(fresh.clone())]);
	let issuer_handle: Arc<dyn TokenIssuer> = Arc::new(issuer.clone());
	let coordinator = Arc::new(
		RefreshCoordinator::with_shared_issuer(issuer_handle).with_clock(ManualClock::new(NOW)),
	);
	let foreground_cancel = CancellationToken::new();
	let foreground = {
		let coordinator = coordinator.clone();
		let ctx = RefreshContext::new().with_cancellation(foreground_cancel.clone());

		tokio::spawn(async move { coordinator.ensure_fresh(ctx).await })
	};

	issuer.wait_for_calls(1).await;

	let shutdown = CancellationToken::new();
	let handle = coordinator.start_background_refresh(shutdown.clone());

	// The first tick finds the slot empty and joins the foreground refresh.
	tokio::time::sleep(TICK + StdDuration::from_secs(1)).await;

	assert_eq!(coordinator.metrics().joins(), 1);

	foreground_cancel.cancel();

	let err = foreground
		.await
		.expect("Foreground task should not panic.")
		.expect_err("Foreground refresh should observe its own cancellation.");

	assert!(err.is_cancelled());

	while coordinator.metrics().background_failures() == 0 {
		tokio::task::yield_now().await;
	}

	assert!(!handle.is_finished());
	assert!(!shutdown.is_cancelled());

	// The next tick leads its own refresh.
	issuer.release(1);
	tokio::time::sleep(TICK).await;

	assert_eq!(issuer.calls(), 2);
	assert_eq!(coordinator.current(), Some(fresh));
	assert_eq!(coordinator.metrics().background_failures(), 1);

	handle.shutdown().await.expect("Loop should exit cleanly.");
}
