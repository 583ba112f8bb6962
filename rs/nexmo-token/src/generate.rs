use rsa::RsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::rand_core::OsRng;

use crate::{Error, Key, MIN_KEY_BITS, Result};

impl Key {
	/// Generate a new RSA private key with a modulus of `bits` bits.
	pub fn generate(bits: usize) -> Result<Self> {
		if bits < MIN_KEY_BITS {
			return Err(Error::Generate(format!("at least {MIN_KEY_BITS} bits are required")));
		}

		let key = RsaPrivateKey::new(&mut OsRng, bits).map_err(|err| Error::Generate(err.to_string()))?;
		Ok(Self::Private(key))
	}

	/// Encode a private key as a PKCS#8 `PRIVATE KEY` PEM.
	pub fn to_private_pem(&self) -> Result<String> {
		let Self::Private(key) = self else {
			return Err(Error::Generate("not a private key".to_string()));
		};

		let pem = key
			.to_pkcs8_pem(LineEnding::LF)
			.map_err(|err| Error::Generate(err.to_string()))?;
		Ok(pem.to_string())
	}

	/// Encode the public half of the key as a `PUBLIC KEY` PEM.
	pub fn to_public_pem(&self) -> Result<String> {
		self.public_key()
			.to_public_key_pem(LineEnding::LF)
			.map_err(|err| Error::Generate(err.to_string()))
	}
}
