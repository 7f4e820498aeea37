//! Many request handlers asking for a token at once share a single issuer call.

// std
use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration as StdDuration,
};
// crates.io
use color_eyre::Result;
use time::{Duration, OffsetDateTime};
// self
use token_sentinel::{RefreshContext, RefreshCoordinator, Token, issue_fn};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let calls = Arc::new(AtomicUsize::new(0));
	let issuer = issue_fn({
		let calls = calls.clone();

		move || {
			let n = calls.fetch_add(1, Ordering::SeqCst) + 1;

			async move {
				tokio::time::sleep(StdDuration::from_millis(100)).await;

				Ok(Token::new(
					format!("access-{n}"),
					OffsetDateTime::now_utc() + Duration::hours(1),
				))
			}
		}
	});
	let coordinator = Arc::new(RefreshCoordinator::new(issuer));
	let handlers = (0..64)
		.map(|_| {
			let coordinator = coordinator.clone();

			tokio::spawn(async move {
				coordinator
					.ensure_fresh(RefreshContext::new().with_timeout(Duration::seconds(5)))
					.await
			})
		})
		.collect::<Vec<_>>();

	for handler in handlers {
		handler.await??;
	}

	println!(
		"64 callers, {} issuer call(s), {} joined an in-flight refresh.",
		calls.load(Ordering::SeqCst),
		coordinator.metrics().joins(),
	);

	Ok(())
}
