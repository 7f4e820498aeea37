//! Client-credentials token issuer backed by `reqwest`.
//!
//! [`ReqwestTokenIssuer`] posts `grant_type=client_credentials` to a token endpoint and accepts a
//! JSON body carrying `access_token` plus either `expires_at` (absolute Unix milliseconds) or
//! `expires_in` (seconds from receipt). Redirects are never followed; token endpoints answer
//! directly.

// crates.io
use reqwest::{
	Client as ReqwestClient, StatusCode,
	header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue},
	redirect::Policy,
};
use url::Url;
// self
use crate::{
	_prelude::*,
	clock::{Clock, SystemClock},
	error::{ConfigError, IssuanceError},
	issuer::{IssueFuture, TokenIssuer},
	token::{Token, TokenSecret},
};

/// How the issuer authenticates against the token endpoint.
#[derive(Clone, Debug)]
pub enum ClientAuth {
	/// HTTP Basic with a client identifier and secret.
	Basic {
		/// OAuth client identifier.
		client_id: String,
		/// OAuth client secret.
		client_secret: TokenSecret,
	},
	/// A pre-encoded Basic credential sent verbatim as `Authorization: Basic <key>`.
	AuthorizationKey(TokenSecret),
}
impl ClientAuth {
	/// Builds HTTP Basic credentials.
	pub fn basic(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self::Basic { client_id: client_id.into(), client_secret: TokenSecret::new(client_secret) }
	}

	/// Wraps an already base64-encoded authorization key.
	pub fn authorization_key(key: impl Into<String>) -> Self {
		Self::AuthorizationKey(TokenSecret::new(key))
	}
}

/// [`TokenIssuer`] that performs an OAuth 2.0 client-credentials exchange over HTTP.
pub struct ReqwestTokenIssuer {
	client: ReqwestClient,
	token_endpoint: Url,
	auth: ClientAuth,
	scope: Option<String>,
	headers: HeaderMap,
	clock: Arc<dyn Clock>,
}
impl ReqwestTokenIssuer {
	/// Creates an issuer with its own HTTP client that never follows redirects.
	pub fn new(token_endpoint: Url, auth: ClientAuth) -> Result<Self> {
		let client =
			ReqwestClient::builder().redirect(Policy::none()).build().map_err(ConfigError::from)?;

		Ok(Self::with_client(client, token_endpoint, auth))
	}

	/// Creates an issuer around an existing client.
	///
	/// Configure the client with [`Policy::none`] so redirects are surfaced as rejections.
	pub fn with_client(client: ReqwestClient, token_endpoint: Url, auth: ClientAuth) -> Self {
		Self {
			client,
			token_endpoint,
			auth,
			scope: None,
			headers: HeaderMap::new(),
			clock: Arc::new(SystemClock),
		}
	}

	/// Sends `scope` with every request.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Attaches a header to every request, e.g. a request identifier.
	pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
		let invalid = || ConfigError::InvalidHeader { name: name.to_owned() };
		let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
		let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;

		self.headers.insert(header_name, header_value);

		Ok(self)
	}

	/// Replaces the clock used to anchor `expires_in` responses.
	pub fn with_clock<C>(mut self, clock: C) -> Self
	where
		C: 'static + Clock,
	{
		self.clock = Arc::new(clock);

		self
	}

	/// Token endpoint this issuer posts to.
	pub fn token_endpoint(&self) -> &Url {
		&self.token_endpoint
	}

	async fn exchange(&self) -> Result<Token> {
		let mut form = vec![("grant_type", "client_credentials")];

		if let Some(scope) = &self.scope {
			form.push(("scope", scope.as_str()));
		}

		let request = self
			.client
			.post(self.token_endpoint.clone())
			.headers(self.headers.clone())
			.header(ACCEPT, "application/json")
			.form(&form);
		let request = match &self.auth {
			ClientAuth::Basic { client_id, client_secret } =>
				request.basic_auth(client_id, Some(client_secret.expose())),
			ClientAuth::AuthorizationKey(key) =>
				request.header(AUTHORIZATION, format!("Basic {}", key.expose())),
		};
		let response = request.send().await.map_err(IssuanceError::from)?;
		let status = response.status();
		let body = response.bytes().await.map_err(IssuanceError::from)?;

		if !status.is_success() {
			#[cfg(feature = "tracing")]
			tracing::debug!(status = status.as_u16(), "Token endpoint rejected the request.");

			return Err(rejection(status, &body).into());
		}

		parse_token(&body, self.clock.now())
	}
}
impl TokenIssuer for ReqwestTokenIssuer {
	fn issue(&self) -> IssueFuture<'_> {
		Box::pin(self.exchange())
	}
}
impl Debug for ReqwestTokenIssuer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ReqwestTokenIssuer")
			.field("token_endpoint", &self.token_endpoint.as_str())
			.field("auth", &self.auth)
			.field("scope", &self.scope)
			.finish_non_exhaustive()
	}
}

#[derive(Deserialize)]
struct TokenResponse {
	access_token: String,
	#[serde(default)]
	expires_at: Option<i64>,
	#[serde(default)]
	expires_in: Option<i64>,
}

#[derive(Default, Deserialize)]
struct ErrorResponse {
	#[serde(default)]
	error: Option<String>,
	#[serde(default)]
	error_description: Option<String>,
	#[serde(default)]
	message: Option<String>,
}

fn parse_token(body: &[u8], now: OffsetDateTime) -> Result<Token> {
	let mut de = serde_json::Deserializer::from_slice(body);
	let response: TokenResponse =
		serde_path_to_error::deserialize(&mut de).map_err(|e| malformed(e.to_string()))?;

	if response.access_token.is_empty() {
		return Err(malformed("`access_token` is empty"));
	}

	match (response.expires_at, response.expires_in) {
		(Some(millis), _) if millis > 0 => Token::from_unix_millis(response.access_token, millis)
			.map_err(|_| malformed(format!("`expires_at` {millis} is out of range"))),
		(Some(millis), _) => Err(malformed(format!("`expires_at` {millis} is not positive"))),
		(None, Some(secs)) if secs > 0 => {
			let expires_at = now
				.checked_add(Duration::seconds(secs))
				.ok_or_else(|| malformed(format!("`expires_in` {secs} is out of range")))?;

			Ok(Token::new(response.access_token, expires_at))
		},
		(None, Some(secs)) => Err(malformed(format!("`expires_in` {secs} is not positive"))),
		(None, None) => Err(malformed("response carries neither `expires_at` nor `expires_in`")),
	}
}

fn malformed(reason: impl Into<String>) -> Error {
	IssuanceError::malformed(reason).into()
}

fn rejection(status: StatusCode, body: &[u8]) -> IssuanceError {
	let parsed: ErrorResponse = serde_json::from_slice(body).unwrap_or_default();
	let reason = parsed
		.error_description
		.or(parsed.error)
		.or(parsed.message)
		.filter(|reason| !reason.is_empty())
		.unwrap_or_else(|| match status.canonical_reason() {
			Some(reason) => format!("HTTP {} {reason}", status.as_u16()),
			None => format!("HTTP {}", status.as_u16()),
		});

	IssuanceError::rejected(Some(status.as_u16()), reason)
}
