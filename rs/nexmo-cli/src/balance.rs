use std::fmt;

use anyhow::{Context, bail};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::Config;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Balance {
	/// The remaining balance, in euros.
	pub value: f64,

	#[serde(rename = "autoReload")]
	pub auto_reload: bool,
}

impl fmt::Display for Balance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Your Balance is: {}, and your Current AutoReload Setting is: {}",
			self.value, self.auto_reload
		)
	}
}

/// GET the account balance, authenticating with the key and secret as query parameters.
pub async fn fetch(client: &Client, url: Url, api_key: &str, api_secret: &str) -> anyhow::Result<Balance> {
	// Errors would otherwise include the full URL, secret and all.
	let response = client
		.get(url.clone())
		.query(&[("api_key", api_key), ("api_secret", api_secret)])
		.send()
		.await
		.map_err(|err| err.without_url())
		.with_context(|| format!("failed to request balance from {url}"))?;

	let status = response.status();
	if !status.is_success() {
		bail!("balance request failed with {status}");
	}

	response
		.json::<Balance>()
		.await
		.map_err(|err| err.without_url())
		.context("invalid balance response")
}

pub async fn run(config: &Config, client: &Client) -> anyhow::Result<()> {
	let url = config.balance_url()?;

	tracing::info!(%url, "requesting balance");
	let balance = fetch(client, url, config.api_key()?, config.api_secret()?).await?;

	println!("{balance}");

	Ok(())
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use wiremock::matchers::{method, path, query_param};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	use super::*;

	fn balance_url(server: &MockServer) -> Url {
		Url::parse(&format!("{}/account/get-balance", server.uri())).unwrap()
	}

	#[test]
	fn parse() {
		let balance: Balance = serde_json::from_str(r#"{"value":10.28,"autoReload":false}"#).unwrap();
		assert_eq!(
			balance,
			Balance {
				value: 10.28,
				auto_reload: false
			}
		);
		assert_eq!(
			balance.to_string(),
			"Your Balance is: 10.28, and your Current AutoReload Setting is: false"
		);
	}

	#[tokio::test]
	async fn fetch_balance() {
		let server = MockServer::start().await;

		Mock::given(method("GET"))
			.and(path("/account/get-balance"))
			.and(query_param("api_key", "abcd1234"))
			.and(query_param("api_secret", "s3cr3t&more"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": 3.5, "autoReload": true })))
			.expect(1)
			.mount(&server)
			.await;

		let balance = fetch(&Client::new(), balance_url(&server), "abcd1234", "s3cr3t&more")
			.await
			.unwrap();

		assert_eq!(balance.value, 3.5);
		assert!(balance.auto_reload);
	}

	#[tokio::test]
	async fn failed_status_hides_secret() {
		let server = MockServer::start().await;

		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(401))
			.mount(&server)
			.await;

		let err = fetch(&Client::new(), balance_url(&server), "key", "topsecret")
			.await
			.unwrap_err();

		let err = format!("{err:#}");
		assert!(err.contains("401"), "{err}");
		assert!(!err.contains("topsecret"), "{err}");
	}

	#[tokio::test]
	async fn invalid_body() {
		let server = MockServer::start().await;

		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(200).set_body_string("<xml/>"))
			.mount(&server)
			.await;

		let err = fetch(&Client::new(), balance_url(&server), "key", "topsecret")
			.await
			.unwrap_err();

		let err = format!("{err:#}");
		assert!(err.contains("invalid balance response"), "{err}");
		assert!(!err.contains("topsecret"), "{err}");
	}

	#[tokio::test]
	async fn run_requires_credentials() {
		let config = Config::default();
		let err = run(&config, &Client::new()).await.unwrap_err();
		assert!(err.to_string().contains("api key"), "{err}");
	}
}
