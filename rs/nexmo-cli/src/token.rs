use std::io::{Read, Write};
use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, bail};
use nexmo_token::{Claims, Key};

use crate::Config;

/// Sign a fresh token for the configured application.
///
/// The private key is read and parsed on every call.
pub async fn issue(config: &Config) -> anyhow::Result<String> {
	let app_id = config.app_id()?;
	let path = config.private_key()?;

	let pem = tokio::fs::read(path)
		.await
		.with_context(|| format!("failed to read private key: {}", path.display()))?;
	let key = Key::from_private_pem(&pem).with_context(|| format!("failed to load private key: {}", path.display()))?;

	let claims = Claims::issue(app_id)?;
	Ok(key.sign(&claims)?)
}

/// Verify a token with the public key and return its payload.
pub async fn verify(public_key: &Path, token: &str, check_expiry: bool) -> anyhow::Result<String> {
	let pem = tokio::fs::read(public_key)
		.await
		.with_context(|| format!("failed to read public key: {}", public_key.display()))?;
	let key = Key::from_public_pem(&pem).with_context(|| format!("failed to load public key: {}", public_key.display()))?;

	let payload = key.decode(token)?;

	if check_expiry {
		let claims = Claims::from_json(&payload)?;
		if claims.is_expired(SystemTime::now()) {
			bail!("token expired");
		}
	}

	Ok(payload)
}

/// Generate a key pair, refusing to overwrite existing files.
pub fn keygen(private: &Path, public: &Path, bits: usize) -> anyhow::Result<()> {
	let key = Key::generate(bits)?;

	create(private, key.to_private_pem()?.as_bytes(), true)?;
	create(public, key.to_public_pem()?.as_bytes(), false)?;

	tracing::info!(private = %private.display(), public = %public.display(), bits, "generated key pair");

	Ok(())
}

pub fn read_stdin() -> anyhow::Result<String> {
	let mut token = String::new();
	std::io::stdin()
		.read_to_string(&mut token)
		.context("failed to read token from stdin")?;
	Ok(token)
}

fn create(path: &Path, contents: &[u8], secret: bool) -> anyhow::Result<()> {
	let mut options = std::fs::OpenOptions::new();
	options.write(true).create_new(true);

	#[cfg(unix)]
	{
		use std::os::unix::fs::OpenOptionsExt;
		if secret {
			options.mode(0o600);
		}
	}
	#[cfg(not(unix))]
	let _ = secret;

	let mut file = options
		.open(path)
		.with_context(|| format!("failed to create {}", path.display()))?;
	file.write_all(contents)
		.with_context(|| format!("failed to write {}", path.display()))?;

	Ok(())
}
