use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};

use crate::{Error, Result};

/// RSA key material parsed from PEM.
///
/// A private key can sign and verify; a public key can only verify.
/// Keys are parsed for each operation and never cached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
	Private(RsaPrivateKey),
	Public(RsaPublicKey),
}

impl Key {
	/// Parse an RSA private key.
	///
	/// Both `RSA PRIVATE KEY` (PKCS#1, as written by `openssl genrsa`) and
	/// `PRIVATE KEY` (PKCS#8) containers are supported.
	pub fn from_private_pem(pem: &[u8]) -> Result<Self> {
		let pem = pem_str(pem)?;

		let key = match label(pem) {
			Some("RSA PRIVATE KEY") => RsaPrivateKey::from_pkcs1_pem(pem).map_err(invalid)?,
			Some("PRIVATE KEY") => RsaPrivateKey::from_pkcs8_pem(pem).map_err(invalid)?,
			Some(other) => return Err(Error::KeyFormat(format!("expected an RSA private key, found {other}"))),
			None => return Err(Error::KeyFormat("no PEM block found".to_string())),
		};

		Ok(Self::Private(key))
	}

	/// Parse an RSA public key.
	///
	/// Both `RSA PUBLIC KEY` (PKCS#1) and `PUBLIC KEY` (SubjectPublicKeyInfo) containers are supported.
	/// A private key is rejected; use [`Key::to_public`] to derive the public half explicitly.
	pub fn from_public_pem(pem: &[u8]) -> Result<Self> {
		let pem = pem_str(pem)?;

		let key = match label(pem) {
			Some("RSA PUBLIC KEY") => RsaPublicKey::from_pkcs1_pem(pem).map_err(invalid)?,
			Some("PUBLIC KEY") => RsaPublicKey::from_public_key_pem(pem).map_err(invalid)?,
			Some(other) => return Err(Error::KeyFormat(format!("expected an RSA public key, found {other}"))),
			None => return Err(Error::KeyFormat("no PEM block found".to_string())),
		};

		Ok(Self::Public(key))
	}

	pub fn is_private(&self) -> bool {
		matches!(self, Self::Private(_))
	}

	/// Return only the public half of the key.
	pub fn to_public(&self) -> Self {
		Self::Public(self.public_key())
	}

	pub fn modulus(&self) -> &BigUint {
		match self {
			Self::Private(key) => key.n(),
			Self::Public(key) => key.n(),
		}
	}

	pub fn public_exponent(&self) -> &BigUint {
		match self {
			Self::Private(key) => key.e(),
			Self::Public(key) => key.e(),
		}
	}

	pub fn private_exponent(&self) -> Option<&BigUint> {
		match self {
			Self::Private(key) => Some(key.d()),
			Self::Public(_) => None,
		}
	}

	/// The prime factors of the modulus, for private keys.
	pub fn primes(&self) -> Option<&[BigUint]> {
		match self {
			Self::Private(key) => Some(key.primes()),
			Self::Public(_) => None,
		}
	}

	/// The size of the modulus in bits.
	pub fn bits(&self) -> usize {
		self.modulus().bits()
	}

	pub(crate) fn public_key(&self) -> RsaPublicKey {
		match self {
			Self::Private(key) => key.to_public_key(),
			Self::Public(key) => key.clone(),
		}
	}
}

fn invalid(err: impl std::fmt::Display) -> Error {
	Error::KeyFormat(err.to_string())
}

fn pem_str(pem: &[u8]) -> Result<&str> {
	let pem = std::str::from_utf8(pem).map_err(|_| Error::KeyFormat("key is not valid UTF-8".to_string()))?;
	Ok(pem.trim())
}

// Returns the label of the first PEM block, ex. "RSA PRIVATE KEY".
fn label(pem: &str) -> Option<&str> {
	const BEGIN: &str = "-----BEGIN ";

	let start = pem.find(BEGIN)? + BEGIN.len();
	let len = pem[start..].find("-----")?;
	Some(&pem[start..start + len])
}
