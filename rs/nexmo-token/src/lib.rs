//! Application token generation and verification for the Nexmo API.
//!
//! The messaging endpoint authenticates requests with a short-lived JWT signed by the
//! application's RSA private key (RS256). This crate builds the claims, loads the key
//! from PEM, and produces or verifies the compact token.
//!
//! See [`Claims`] for the claims structure and [`Key`] for key handling.
//!
//! ```no_run
//! let pem = std::fs::read("private.key")?;
//! let key = nexmo_token::Key::from_private_pem(&pem)?;
//! let claims = nexmo_token::Claims::issue("aaaaaaaa-bbbb-cccc-dddd-0123456789ab")?;
//! let token = key.sign(&claims)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod claims;
mod error;
mod generate;
mod key;
mod token;

pub use claims::*;
pub use error::*;
pub use key::*;
pub use token::*;
