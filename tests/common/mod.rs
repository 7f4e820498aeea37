#![allow(dead_code)]

// std
use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration as StdDuration,
};
// crates.io
use time::{Duration, OffsetDateTime, macros};
use tokio::sync::Semaphore;
// self
use token_sentinel::{IssueFuture, Result, Token, TokenIssuer};

pub const NOW: OffsetDateTime = macros::datetime!(2025-11-10 12:00 UTC);

/// Issuer whose calls block until the test releases them, then return the next scripted outcome.
#[derive(Clone)]
pub struct GatedIssuer {
	calls: Arc<AtomicUsize>,
	gate: Arc<Semaphore>,
	outcomes: Arc<parking_lot::Mutex<Vec<Result<Token>>>>,
}
impl GatedIssuer {
	/// Outcomes are handed out in order; the last one repeats.
	pub fn new(outcomes: Vec<Result<Token>>) -> Self {
		assert!(!outcomes.is_empty(), "At least one scripted outcome is required.");

		Self {
			calls: Arc::new(AtomicUsize::new(0)),
			gate: Arc::new(Semaphore::new(0)),
			outcomes: Arc::new(parking_lot::Mutex::new(outcomes)),
		}
	}

	/// Lets `n` pending or future issuer calls proceed.
	pub fn release(&self, n: usize) {
		self.gate.add_permits(n);
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	/// Waits until at least `n` calls have entered the issuer.
	pub async fn wait_for_calls(&self, n: usize) {
		while self.calls() < n {
			tokio::time::sleep(StdDuration::from_millis(1)).await;
		}
	}

	fn next_outcome(&self) -> Result<Token> {
		let mut outcomes = self.outcomes.lock();

		if outcomes.len() > 1 { outcomes.remove(0) } else { outcomes[0].clone() }
	}
}
impl TokenIssuer for GatedIssuer {
	fn issue(&self) -> IssueFuture<'_> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			self.gate.acquire().await.expect("Gate semaphore should stay open.").forget();

			self.next_outcome()
		})
	}
}

pub fn token(value: &str, lifetime: Duration) -> Token {
	Token::new(value, NOW + lifetime)
}
