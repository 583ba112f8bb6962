use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use serde::Deserialize;
use url::Url;

pub const MESSAGES_URL: &str = "https://api.nexmo.com/v0.1/messages";
pub const BALANCE_URL: &str = "https://rest.nexmo.com/account/get-balance";

/// Account and application settings.
///
/// Flags and environment variables take precedence over the `--config` file.
#[derive(Args, Clone, Debug, Default)]
pub struct Config {
	/// A TOML file providing defaults for any of the settings below.
	#[arg(long, env = "NEXMO_CONFIG", global = true)]
	pub config: Option<PathBuf>,

	/// The application id, used to sign message tokens.
	#[arg(long, env = "NEXMO_APP_ID", global = true)]
	pub app_id: Option<String>,

	/// Path to the application's RSA private key (PEM).
	#[arg(long, env = "NEXMO_PRIVATE_KEY", global = true)]
	pub private_key: Option<PathBuf>,

	/// The account API key, used to check the balance.
	#[arg(long, env = "NEXMO_API_KEY", global = true)]
	pub api_key: Option<String>,

	/// The account API secret, used to check the balance.
	#[arg(long, env = "NEXMO_API_SECRET", hide_env_values = true, global = true)]
	pub api_secret: Option<String>,

	#[arg(long, env = "NEXMO_MESSAGES_URL", global = true)]
	pub messages_url: Option<Url>,

	#[arg(long, env = "NEXMO_BALANCE_URL", global = true)]
	pub balance_url: Option<Url>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, default)]
struct ConfigFile {
	app_id: Option<String>,
	private_key: Option<PathBuf>,
	api_key: Option<String>,
	api_secret: Option<String>,
	messages_url: Option<Url>,
	balance_url: Option<Url>,
}

impl Config {
	/// Fill in any unset values from the `--config` file, if one was given.
	///
	/// A relative `private_key` in the file is resolved against the file's directory.
	pub fn load(mut self) -> anyhow::Result<Self> {
		let Some(path) = self.config.clone() else {
			return Ok(self);
		};

		let contents =
			std::fs::read_to_string(&path).with_context(|| format!("failed to read config: {}", path.display()))?;
		let mut file: ConfigFile =
			toml::from_str(&contents).with_context(|| format!("failed to parse config: {}", path.display()))?;

		if let (Some(key), Some(dir)) = (file.private_key.as_mut(), path.parent()) {
			if key.is_relative() {
				*key = dir.join(&*key);
			}
		}

		self.app_id = self.app_id.or(file.app_id);
		self.private_key = self.private_key.or(file.private_key);
		self.api_key = self.api_key.or(file.api_key);
		self.api_secret = self.api_secret.or(file.api_secret);
		self.messages_url = self.messages_url.or(file.messages_url);
		self.balance_url = self.balance_url.or(file.balance_url);

		tracing::debug!(path = %path.display(), "loaded config");

		Ok(self)
	}

	pub fn app_id(&self) -> anyhow::Result<&str> {
		self.app_id
			.as_deref()
			.context("missing application id: set --app-id or NEXMO_APP_ID")
	}

	pub fn private_key(&self) -> anyhow::Result<&Path> {
		self.private_key
			.as_deref()
			.context("missing private key: set --private-key or NEXMO_PRIVATE_KEY")
	}

	pub fn api_key(&self) -> anyhow::Result<&str> {
		self.api_key
			.as_deref()
			.context("missing api key: set --api-key or NEXMO_API_KEY")
	}

	pub fn api_secret(&self) -> anyhow::Result<&str> {
		self.api_secret
			.as_deref()
			.context("missing api secret: set --api-secret or NEXMO_API_SECRET")
	}

	pub fn messages_url(&self) -> anyhow::Result<Url> {
		match &self.messages_url {
			Some(url) => Ok(url.clone()),
			None => Ok(Url::parse(MESSAGES_URL)?),
		}
	}

	pub fn balance_url(&self) -> anyhow::Result<Url> {
		match &self.balance_url {
			Some(url) => Ok(url.clone()),
			None => Ok(Url::parse(BALANCE_URL)?),
		}
	}
}
