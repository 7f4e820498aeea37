//! The token issuance boundary.
//!
//! An issuer performs one request/response exchange with the credential authority and yields a
//! [`Token`]. Deadlines and cancellation are imposed from outside by dropping the returned
//! future, so implementations only need to be cancel-safe.

// self
use crate::{_prelude::*, token::Token};

/// Boxed future returned by [`TokenIssuer::issue`].
pub type IssueFuture<'a> = Pin<Box<dyn Future<Output = Result<Token>> + 'a + Send>>;

/// Source of freshly issued tokens.
pub trait TokenIssuer
where
	Self: Send + Sync,
{
	/// Requests a new token. Calling this twice issues two tokens.
	fn issue(&self) -> IssueFuture<'_>;
}
impl<I> TokenIssuer for Arc<I>
where
	I: ?Sized + TokenIssuer,
{
	fn issue(&self) -> IssueFuture<'_> {
		(**self).issue()
	}
}

/// Adapts an async closure into a [`TokenIssuer`].
pub fn issue_fn<F, Fut>(f: F) -> FnIssuer<F>
where
	F: Fn() -> Fut + Send + Sync,
	Fut: Future<Output = Result<Token>> + Send + 'static,
{
	FnIssuer(f)
}

/// [`TokenIssuer`] backed by a closure; see [`issue_fn`].
#[derive(Clone)]
pub struct FnIssuer<F>(F);
impl<F, Fut> TokenIssuer for FnIssuer<F>
where
	F: Fn() -> Fut + Send + Sync,
	Fut: Future<Output = Result<Token>> + Send + 'static,
{
	fn issue(&self) -> IssueFuture<'_> {
		Box::pin((self.0)())
	}
}
impl<F> Debug for FnIssuer<F> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FnIssuer(..)")
	}
}
