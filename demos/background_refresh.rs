//! Keeps a client-credentials token fresh in the background while request handlers read it.

// std
use std::{sync::Arc, time::Duration as StdDuration};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use token_sentinel::{
	CancellationToken, RefreshContext, RefreshCoordinator, RefresherConfig,
	http::{ClientAuth, ReqwestTokenIssuer},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			// Shorter than the staleness buffer below, so every check refreshes.
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":2}",
			);
		})
		.await;
	let issuer = ReqwestTokenIssuer::new(
		Url::parse(&server.url("/token"))?,
		ClientAuth::basic("demo-client", "super-secret"),
	)?
	.with_scope("api.read");
	let config = RefresherConfig::default()
		.with_staleness_buffer(time::Duration::seconds(5))
		.with_check_interval(time::Duration::milliseconds(200));
	let coordinator = Arc::new(RefreshCoordinator::new(issuer).with_config(config));
	let shutdown = CancellationToken::new();
	let background = coordinator.start_background_refresh(shutdown.clone());
	let token = coordinator.fresh_token(RefreshContext::new()).await?;

	println!("Initial token expires at {}.", token.expires_at);

	tokio::time::sleep(StdDuration::from_secs(1)).await;
	shutdown.cancel();
	background.join().await?;

	let metrics = coordinator.metrics();

	println!(
		"Background checks: {}, issuer calls: {}, failures: {}.",
		metrics.background_checks(),
		metrics.issuer_calls(),
		metrics.failures(),
	);

	token_mock.assert_calls_async(metrics.issuer_calls() as usize).await;

	Ok(())
}
