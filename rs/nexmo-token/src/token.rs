use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::traits::PublicKeyParts;

use crate::{Claims, Error, Key, Result};

/// RSA keys smaller than this are refused for signing.
pub const MIN_KEY_BITS: usize = 2048;

impl Key {
	/// Sign the claims with RS256, returning the compact `header.payload.signature` token.
	///
	/// PKCS#1 v1.5 signatures are deterministic, so the same claims and key always produce the same token.
	pub fn sign(&self, claims: &Claims) -> Result<String> {
		let Self::Private(key) = self else {
			return Err(Error::Signing("a private key is required".to_string()));
		};

		let bits = self.bits();
		if bits < MIN_KEY_BITS {
			return Err(Error::Signing(format!(
				"{bits} bit key is too small, at least {MIN_KEY_BITS} bits are required"
			)));
		}

		key.validate().map_err(|err| Error::Signing(err.to_string()))?;

		let der = key.to_pkcs1_der().map_err(|err| Error::Signing(err.to_string()))?;
		let encoding = EncodingKey::from_rsa_der(der.as_bytes());

		let token = jsonwebtoken::encode(&Header::new(Algorithm::RS256), claims, &encoding)
			.map_err(|err| Error::Signing(err.to_string()))?;

		tracing::debug!(application_id = %claims.application_id, jti = %claims.id, "signed token");

		Ok(token)
	}

	/// Verify the token's signature and return its payload JSON exactly as it was signed.
	///
	/// The `exp` and `iat` claims are not checked against the clock; the API does that.
	/// Use [`Claims::from_json`] and [`Claims::is_expired`] to check locally.
	pub fn decode(&self, token: &str) -> Result<String> {
		let token = token.trim();

		let mut segments = token.split('.');
		let (Some(header), Some(payload), Some(signature), None) =
			(segments.next(), segments.next(), segments.next(), segments.next())
		else {
			return Err(Error::TokenFormat("expected three dot separated segments".to_string()));
		};

		let header = segment(header, "header")?;
		let header: Header =
			serde_json::from_slice(&header).map_err(|err| Error::TokenFormat(format!("invalid header: {err}")))?;
		if header.alg != Algorithm::RS256 {
			return Err(Error::TokenFormat(format!("unsupported algorithm: {:?}", header.alg)));
		}

		let payload = segment(payload, "payload")?;
		let payload =
			String::from_utf8(payload).map_err(|_| Error::TokenFormat("payload is not valid UTF-8".to_string()))?;
		serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&payload)
			.map_err(|err| Error::TokenFormat(format!("payload is not a JSON object: {err}")))?;

		// A signature that doesn't decode can't verify either.
		if signature.is_empty() || URL_SAFE_NO_PAD.decode(signature).is_err() {
			return Err(Error::SignatureVerification);
		}

		let public = self.public_key();
		let decoding = DecodingKey::from_rsa_components(
			&URL_SAFE_NO_PAD.encode(public.n().to_bytes_be()),
			&URL_SAFE_NO_PAD.encode(public.e().to_bytes_be()),
		)
		.map_err(|err| Error::KeyFormat(err.to_string()))?;

		let mut validation = Validation::new(Algorithm::RS256);
		validation.validate_exp = false;
		validation.validate_aud = false;
		validation.required_spec_claims.clear();

		jsonwebtoken::decode::<serde_json::Value>(token, &decoding, &validation).map_err(|err| match err.kind() {
			ErrorKind::InvalidToken | ErrorKind::Json(_) | ErrorKind::Utf8(_) => Error::TokenFormat(err.to_string()),
			_ => Error::SignatureVerification,
		})?;

		Ok(payload)
	}
}

fn segment(encoded: &str, name: &str) -> Result<Vec<u8>> {
	URL_SAFE_NO_PAD
		.decode(encoded)
		.map_err(|err| Error::TokenFormat(format!("invalid {name} encoding: {err}")))
}

#[cfg(test)]
mod tests {
	use std::time::{Duration, SystemTime, UNIX_EPOCH};

	use super::*;

	const PRIVATE_PKCS1: &str = include_str!("testdata/private_pkcs1.pem");
	const PRIVATE_PKCS8: &str = include_str!("testdata/private_pkcs8.pem");
	const PUBLIC_SPKI: &str = include_str!("testdata/public_spki.pem");
	const PUBLIC_PKCS1: &str = include_str!("testdata/public_pkcs1.pem");
	const OTHER_PUBLIC: &str = include_str!("testdata/other_public.pem");
	const SMALL_PRIVATE: &str = include_str!("testdata/small_private.pem");

	fn private() -> Key {
		Key::from_private_pem(PRIVATE_PKCS1.as_bytes()).unwrap()
	}

	fn public() -> Key {
		Key::from_public_pem(PUBLIC_SPKI.as_bytes()).unwrap()
	}

	fn claims() -> Claims {
		Claims::new("app-123", UNIX_EPOCH + Duration::from_secs(1_700_000_000)).unwrap()
	}

	// Replace the signature segment, keeping the header and payload.
	fn with_signature(token: &str, signature: &str) -> String {
		let (signed, _) = token.rsplit_once('.').unwrap();
		format!("{signed}.{signature}")
	}

	#[test]
	fn round_trip() {
		let claims = claims();
		let token = private().sign(&claims).unwrap();

		let payload = public().decode(&token).unwrap();
		assert_eq!(payload, serde_json::to_string(&claims).unwrap());
		assert_eq!(Claims::from_json(&payload).unwrap(), claims);
	}

	#[test]
	fn compact_format() {
		let token = private().sign(&claims()).unwrap();

		let segments: Vec<&str> = token.split('.').collect();
		assert_eq!(segments.len(), 3);

		let header: serde_json::Value = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(segments[0]).unwrap()).unwrap();
		assert_eq!(header["alg"], "RS256");
		assert_eq!(header["typ"], "JWT");

		// 2048 bit modulus
		assert_eq!(URL_SAFE_NO_PAD.decode(segments[2]).unwrap().len(), 256);
	}

	#[test]
	fn deterministic() {
		let claims = claims();
		let key = private();
		assert_eq!(key.sign(&claims).unwrap(), key.sign(&claims).unwrap());

		let pkcs8 = Key::from_private_pem(PRIVATE_PKCS8.as_bytes()).unwrap();
		assert_eq!(key.sign(&claims).unwrap(), pkcs8.sign(&claims).unwrap());
	}

	#[test]
	fn generated_key_pair() {
		let private = Key::generate(2048).unwrap();
		let public = private.to_public();

		let token = private.sign(&claims()).unwrap();
		let payload = public.decode(&token).unwrap();

		let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
		assert_eq!(value["exp"], 1_700_003_600);
		assert_eq!(value["iat"], 1_700_000_000);
		assert_eq!(value["application_id"], "app-123");
	}

	#[test]
	fn decode_with_private_key() {
		let key = private();
		let token = key.sign(&claims()).unwrap();
		assert!(key.decode(&token).is_ok());
	}

	#[test]
	fn decode_with_pkcs1_public_key() {
		let token = private().sign(&claims()).unwrap();
		let public = Key::from_public_pem(PUBLIC_PKCS1.as_bytes()).unwrap();
		assert!(public.decode(&token).is_ok());
	}

	#[test]
	fn decode_ignores_expiry() {
		let claims = Claims::new("app", UNIX_EPOCH + Duration::from_secs(1)).unwrap();
		assert!(claims.is_expired(SystemTime::now()));

		let token = private().sign(&claims).unwrap();
		assert!(public().decode(&token).is_ok());
	}

	#[test]
	fn tampered_signature_text() {
		let token = private().sign(&claims()).unwrap();
		let public = public();
		let (_, signature) = token.rsplit_once('.').unwrap();

		for (i, c) in signature.char_indices() {
			let replacement = if c == 'A' { 'B' } else { 'A' };
			let mut tampered = signature.to_string();
			tampered.replace_range(i..i + 1, &replacement.to_string());

			let result = public.decode(&with_signature(&token, &tampered));
			assert!(matches!(result, Err(Error::SignatureVerification)), "position {i}: {result:?}");
		}
	}

	#[test]
	fn tampered_signature_bytes() {
		let token = private().sign(&claims()).unwrap();
		let public = public();
		let (_, signature) = token.rsplit_once('.').unwrap();
		let signature = URL_SAFE_NO_PAD.decode(signature).unwrap();

		for i in 0..signature.len() {
			let mut tampered = signature.clone();
			tampered[i] ^= 0x01;

			let result = public.decode(&with_signature(&token, &URL_SAFE_NO_PAD.encode(&tampered)));
			assert!(matches!(result, Err(Error::SignatureVerification)), "byte {i}: {result:?}");
		}
	}

	#[test]
	fn tampered_payload() {
		let token = private().sign(&claims()).unwrap();
		let segments: Vec<&str> = token.split('.').collect();

		let forged = Claims::new("someone-else", UNIX_EPOCH + Duration::from_secs(1_700_000_000)).unwrap();
		let forged = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());
		let token = format!("{}.{}.{}", segments[0], forged, segments[2]);

		assert!(matches!(public().decode(&token), Err(Error::SignatureVerification)));
	}

	#[test]
	fn wrong_key() {
		let token = private().sign(&claims()).unwrap();
		let other = Key::from_public_pem(OTHER_PUBLIC.as_bytes()).unwrap();
		assert!(matches!(other.decode(&token), Err(Error::SignatureVerification)));
	}

	#[test]
	fn missing_signature() {
		let token = private().sign(&claims()).unwrap();
		assert!(matches!(public().decode(&with_signature(&token, "")), Err(Error::SignatureVerification)));
	}

	#[test]
	fn segment_count() {
		let token = private().sign(&claims()).unwrap();
		let public = public();

		for malformed in ["", "abc", "a.b", &format!("{token}.extra")] {
			assert!(matches!(public.decode(malformed), Err(Error::TokenFormat(_))), "{malformed}");
		}

		let (two, _) = token.rsplit_once('.').unwrap();
		assert!(matches!(public.decode(two), Err(Error::TokenFormat(_))));
	}

	#[test]
	fn malformed_segments() {
		let token = private().sign(&claims()).unwrap();
		let segments: Vec<&str> = token.split('.').collect();
		let public = public();

		let bad_header = format!("!!!.{}.{}", segments[1], segments[2]);
		assert!(matches!(public.decode(&bad_header), Err(Error::TokenFormat(_))));

		let bad_payload = format!("{}.%%%.{}", segments[0], segments[2]);
		assert!(matches!(public.decode(&bad_payload), Err(Error::TokenFormat(_))));

		let not_object = URL_SAFE_NO_PAD.encode("[1,2,3]");
		let not_object = format!("{}.{}.{}", segments[0], not_object, segments[2]);
		assert!(matches!(public.decode(&not_object), Err(Error::TokenFormat(_))));
	}

	#[test]
	fn other_algorithm() {
		let token = private().sign(&claims()).unwrap();
		let segments: Vec<&str> = token.split('.').collect();

		let header = URL_SAFE_NO_PAD.encode(r#"{"typ":"JWT","alg":"HS256"}"#);
		let token = format!("{}.{}.{}", header, segments[1], segments[2]);
		assert!(matches!(public().decode(&token), Err(Error::TokenFormat(_))));

		let header = URL_SAFE_NO_PAD.encode(r#"{"typ":"JWT","alg":"none"}"#);
		let token = format!("{}.{}.{}", header, segments[1], segments[2]);
		assert!(matches!(public().decode(&token), Err(Error::TokenFormat(_))));
	}

	#[test]
	fn public_key_cannot_sign() {
		assert!(matches!(public().sign(&claims()), Err(Error::Signing(_))));
	}

	#[test]
	fn undersized_key() {
		let small = Key::from_private_pem(SMALL_PRIVATE.as_bytes()).unwrap();
		assert_eq!(small.bits(), 1024);
		assert!(matches!(small.sign(&claims()), Err(Error::Signing(_))));
	}

	#[test]
	fn inconsistent_private_exponent() {
		let key = private();
		let d = key.private_exponent().unwrap().clone() + rsa::BigUint::from(2u32);
		let primes = key.primes().unwrap().to_vec();

		// Parses, since the primes are supplied, but d no longer inverts e.
		let broken = rsa::RsaPrivateKey::from_components(key.modulus().clone(), key.public_exponent().clone(), d, primes)
			.unwrap();
		let broken = Key::Private(broken);

		assert!(matches!(broken.sign(&claims()), Err(Error::Signing(_))));
	}
}
