use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::ffi::OsString;

/// Placeholder in the feed payload template replaced by each event's id.
pub const FEED_ID_PLACEHOLDER: &str = "{id}";

const DEFAULT_FEED_PAYLOAD: &str = "message {id}";

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Number of data events the `/sse` endpoint sends before its `close` event
    #[arg(long, env, default_value_t = 255)]
    pub feed_size: u32,

    /// Payload template for each data event. `{id}` is replaced by the event id.
    #[arg(long, env, default_value = DEFAULT_FEED_PAYLOAD)]
    feed_payload: String,

    /// Delay in milliseconds between consecutive feed events
    #[arg(long, env, default_value_t = 0)]
    pub feed_interval_ms: u64,

    /// Reconnection hint in milliseconds sent at the start of the feed
    #[arg(long, env)]
    pub retry_millis: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Parse an explicit argument list, program name excluded. Environment
    /// variables still apply to flags that are not given.
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let program = OsString::from(clap::crate_name!());
        Config::try_parse_from(std::iter::once(program).chain(args.into_iter().map(Into::into)))
    }

    pub fn interface(&self) -> &str {
        self.interface.as_deref().unwrap_or("127.0.0.1")
    }

    pub fn set_feed_payload(mut self, feed_payload: impl Into<String>) -> Self {
        self.feed_payload = feed_payload.into();
        self
    }

    pub fn feed_payload_template(&self) -> &str {
        &self.feed_payload
    }

    /// The payload of feed event `id`.
    pub fn feed_payload(&self, id: u32) -> String {
        render_payload(&self.feed_payload, id)
    }
}

/// Fill `template` for event `id`. Shared with the test client so both sides
/// agree on the expected payloads.
pub fn render_payload(template: &str, id: u32) -> String {
    template.replace(FEED_ID_PLACEHOLDER, &id.to_string())
}
