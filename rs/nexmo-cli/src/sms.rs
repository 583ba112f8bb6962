use anyhow::{Context, bail};
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Serialize;
use url::Url;

use crate::{Config, token, unicode};

/// The request body for the messages endpoint.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SmsRequest {
	pub to: Endpoint,
	pub from: Endpoint,
	pub message: Message,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Endpoint {
	#[serde(rename = "type")]
	pub kind: &'static str,
	pub number: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Message {
	pub content: Content,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Content {
	#[serde(rename = "type")]
	pub kind: &'static str,
	pub text: String,
}

impl SmsRequest {
	pub fn new(to: impl Into<String>, from: impl Into<String>, text: impl Into<String>) -> Self {
		Self {
			to: Endpoint::sms(to),
			from: Endpoint::sms(from),
			message: Message {
				content: Content {
					kind: "text",
					text: text.into(),
				},
			},
		}
	}
}

impl Endpoint {
	fn sms(number: impl Into<String>) -> Self {
		Self {
			kind: "sms",
			number: number.into(),
		}
	}
}

/// POST the message with the token as a bearer credential, returning the response body.
pub async fn send(client: &Client, url: Url, token: &str, request: &SmsRequest) -> anyhow::Result<String> {
	let response = client
		.post(url.clone())
		.bearer_auth(token)
		.header(ACCEPT, "application/json")
		.json(request)
		.send()
		.await
		.with_context(|| format!("failed to send message to {url}"))?;

	let status = response.status();
	let body = response.text().await.context("failed to read response")?;

	if !status.is_success() {
		bail!("message rejected with {status}: {body}");
	}

	Ok(body)
}

pub async fn run(config: &Config, client: &Client, to: String, from: String, text: String) -> anyhow::Result<()> {
	let token = token::issue(config).await?;
	let request = SmsRequest::new(to, from, unicode::unescape(&text));
	let url = config.messages_url()?;

	tracing::info!(%url, to = %request.to.number, from = %request.from.number, "sending message");
	tracing::debug!(body = %serde_json::to_string(&request)?, "request");

	let body = send(client, url, &token, &request).await?;

	println!("{body}");
	println!("Message Sent");

	Ok(())
}
