//! Send SMS messages and check the account balance with the Nexmo API.
//!
//! Messages are authenticated with an application token signed by the application's
//! private key (see [`nexmo_token`]); the balance uses the account key and secret.

mod balance;
mod config;
mod log;
mod sms;
mod token;
mod unicode;

use std::path::PathBuf;

use anyhow::Context;
use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand};

pub use config::*;
pub use log::*;

#[derive(Parser, Clone, Debug)]
#[command(name = "nexmo", version, about = "Check your balance or send an SMS message")]
pub struct Cli {
	#[command(flatten)]
	log: Log,

	#[command(flatten)]
	config: Config,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
	/// Send an SMS message.
	Sms {
		/// The number to send the message to.
		#[arg(short, long, value_parser = NonEmptyStringValueParser::new())]
		to: String,

		/// The number to send the message from.
		#[arg(short, long, value_parser = NonEmptyStringValueParser::new())]
		from: String,

		/// The message text.
		///
		/// Characters that are awkward to type can be written as `\uXXXXXXXX`, ex. `\u0001F600`.
		#[arg(short = 'm', long, value_parser = NonEmptyStringValueParser::new())]
		text: String,
	},

	/// Check the account balance.
	Balance,

	/// Print a freshly signed application token.
	Token,

	/// Verify a token read from stdin and print its claims.
	Verify {
		/// The application's RSA public key (PEM).
		#[arg(long, default_value = "publicKey.pem")]
		public_key: PathBuf,

		/// Also fail if the token has expired.
		#[arg(long)]
		check_expiry: bool,
	},

	/// Generate a new RSA key pair for an application.
	Keygen {
		#[arg(long, default_value = "privateKey.pem")]
		private: PathBuf,

		#[arg(long, default_value = "publicKey.pem")]
		public: PathBuf,

		#[arg(long, default_value_t = 2048)]
		bits: usize,
	},
}

fn client() -> anyhow::Result<reqwest::Client> {
	reqwest::Client::builder()
		.user_agent(concat!("nexmo-cli/", env!("CARGO_PKG_VERSION")))
		.build()
		.context("failed to build HTTP client")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	cli.log.init();

	run(cli.config, cli.command).await
}

async fn run(config: Config, command: Command) -> anyhow::Result<()> {
	match command {
		Command::Sms { to, from, text } => sms::run(&config.load()?, &client()?, to, from, text).await,
		Command::Balance => balance::run(&config.load()?, &client()?).await,
		Command::Token => {
			let token = token::issue(&config.load()?).await?;
			println!("{token}");
			Ok(())
		}
		// Neither of these reads the config, so a broken config file doesn't get in the way.
		Command::Verify {
			public_key,
			check_expiry,
		} => {
			let input = token::read_stdin()?;
			let payload = token::verify(&public_key, &input, check_expiry).await?;
			println!("{payload}");
			Ok(())
		}
		Command::Keygen { private, public, bits } => token::keygen(&private, &public, bits),
	}
}
