//! Authenticated session snapshots and their builder.

// self
use crate::{
	_prelude::*,
	auth::{Role, TokenSecret, UserId},
};

/// Errors produced by [`SessionBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum SessionBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
}

/// Authenticated user context issued by the auth provider.
///
/// The client never mints or refreshes sessions; it only reads them from a
/// [`SessionStore`](crate::store::SessionStore).
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
	/// Account identifier.
	pub user_id: UserId,
	/// Display username.
	pub username: String,
	/// Role claim used by route guards.
	pub role: Role,
	/// Bearer token attached to API requests; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Refresh token, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Instant the access token stops being valid.
	#[serde(with = "time::serde::rfc3339")]
	pub token_expiry: OffsetDateTime,
}
impl Session {
	/// Returns a builder for the provided identity.
	pub fn builder(user_id: UserId, username: impl Into<String>, role: Role) -> SessionBuilder {
		SessionBuilder::new(user_id, username, role)
	}

	/// Returns `true` if the access token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.token_expiry
	}

	/// Returns `true` if the access token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` when the session carries the admin role.
	pub fn is_admin(&self) -> bool {
		matches!(self.role, Role::Admin)
	}
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("user_id", &self.user_id)
			.field("username", &self.username)
			.field("role", &self.role)
			.field("refresh_token_set", &self.refresh_token.is_some())
			.field("token_expiry", &self.token_expiry)
			.finish()
	}
}

/// Builder for [`Session`] values.
#[derive(Debug)]
pub struct SessionBuilder {
	user_id: UserId,
	username: String,
	role: Role,
	access_token: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl SessionBuilder {
	/// Creates a new builder seeded with the account identity.
	pub fn new(user_id: UserId, username: impl Into<String>, role: Role) -> Self {
		Self {
			user_id,
			username: username.into(),
			role,
			access_token: None,
			refresh_token: None,
			expires_at: None,
			expires_in: None,
		}
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from now.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Consumes the builder and produces a [`Session`].
	pub fn build(self) -> Result<Session, SessionBuilderError> {
		let access_token = self.access_token.ok_or(SessionBuilderError::MissingAccessToken)?;
		let token_expiry = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) => OffsetDateTime::now_utc() + delta,
			(None, None) => return Err(SessionBuilderError::MissingExpiry),
		};

		Ok(Session {
			user_id: self.user_id,
			username: self.username,
			role: self.role,
			access_token,
			refresh_token: self.refresh_token,
			token_expiry,
		})
	}
}
