#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The PEM could not be parsed, or did not contain the expected RSA key.
	#[error("invalid key: {0}")]
	KeyFormat(String),

	/// The key can't be used to produce an RS256 signature.
	#[error("signing failed: {0}")]
	Signing(String),

	/// The token is not three well-formed segments.
	#[error("malformed token: {0}")]
	TokenFormat(String),

	#[error("signature verification failed")]
	SignatureVerification,

	#[error("application id must not be empty")]
	EmptyApplicationId,

	#[error("system clock is before the unix epoch")]
	Clock,

	#[error("key generation failed: {0}")]
	Generate(String),
}

pub type Result<T> = std::result::Result<T, Error>;
