use clap::Args;
use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Args, Clone, Debug)]
pub struct Log {
	/// The minimum level of log output, written to stderr.
	///
	/// `RUST_LOG` directives take precedence when set.
	#[arg(long = "log-level", env = "NEXMO_LOG_LEVEL", default_value = "info", global = true)]
	pub level: Level,
}

impl Log {
	pub fn init(&self) {
		let filter = EnvFilter::builder()
			.with_default_directive(LevelFilter::from_level(self.level).into())
			.from_env_lossy();

		// stdout is reserved for command output.
		tracing_subscriber::fmt()
			.with_writer(std::io::stderr)
			.with_env_filter(filter)
			.init();
	}
}
