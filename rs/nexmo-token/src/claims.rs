use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_with::{TimestampSeconds, serde_as};
use uuid::Uuid;

use crate::{Error, Result};

/// How long the API accepts a token after it was issued.
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// The claims carried by an application token.
///
/// Fields serialize in declaration order, which is the order the API documents:
/// `{"iat":..,"application_id":..,"exp":..,"jti":..}`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
	/// When the token was issued, in whole seconds.
	#[serde(rename = "iat")]
	#[serde_as(as = "TimestampSeconds")]
	pub issued: SystemTime,

	/// The application the token acts on behalf of.
	pub application_id: String,

	/// Always `issued + TOKEN_LIFETIME`.
	#[serde(rename = "exp")]
	#[serde_as(as = "TimestampSeconds")]
	pub expires: SystemTime,

	/// A random UUID so two tokens issued in the same second still differ.
	#[serde(rename = "jti")]
	pub id: String,
}

impl Claims {
	/// Build the claims for a token issued at `now`.
	///
	/// `now` is truncated to whole seconds so the serialized timestamps are exact.
	pub fn new(application_id: impl Into<String>, now: SystemTime) -> Result<Self> {
		let application_id = application_id.into();
		if application_id.trim().is_empty() {
			return Err(Error::EmptyApplicationId);
		}

		let secs = now.duration_since(UNIX_EPOCH).map_err(|_| Error::Clock)?.as_secs();
		let issued = UNIX_EPOCH + Duration::from_secs(secs);

		let expires = issued.checked_add(TOKEN_LIFETIME).ok_or(Error::Clock)?;

		Ok(Self {
			issued,
			application_id,
			expires,
			id: Uuid::new_v4().to_string(),
		})
	}

	/// Build the claims for a token issued right now, according to the system clock.
	pub fn issue(application_id: impl Into<String>) -> Result<Self> {
		Self::new(application_id, SystemTime::now())
	}

	/// Parse a payload returned by [`crate::Key::decode`].
	pub fn from_json(payload: &str) -> Result<Self> {
		serde_json::from_str(payload).map_err(|err| Error::TokenFormat(format!("invalid claims: {err}")))
	}

	pub fn is_expired(&self, now: SystemTime) -> bool {
		now >= self.expires
	}
}
