use anyhow::Result;
use clap::Parser;
use colored::*;

use testing_tools::output::print_test_summary;
use testing_tools::scenarios::{self, FeedExpectation};

#[derive(Parser)]
#[command(name = "sse-test-client")]
#[command(about = "Renders an SSE feed into a list and checks the result")]
struct Cli {
    /// Base URL of the fixture server (e.g., http://localhost:4000)
    #[arg(long)]
    base_url: String,

    /// Test scenario to run
    #[arg(long, value_enum)]
    scenario: ScenarioChoice,

    /// Number of messages the feed is expected to deliver
    #[arg(long, default_value_t = 255)]
    expected_count: u32,

    /// Expected payload of each message; `{id}` is replaced by the message id
    #[arg(long, default_value = "message {id}")]
    payload_template: String,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone)]
enum ScenarioChoice {
    /// Check the stream opens, renders the expected count and closes cleanly
    Connection,
    /// Check every message is rendered in order with the expected payload
    MessageFeed,
    /// Run every scenario
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    let base_url = cli.base_url.trim_end_matches('/');
    let expected = FeedExpectation {
        count: cli.expected_count,
        payload_template: cli.payload_template,
    };

    println!("\n{}", "=== TEST PHASE ===".bright_white().bold());

    let mut results = Vec::new();

    match cli.scenario {
        ScenarioChoice::Connection => {
            results.push(scenarios::test_connection(base_url, &expected, cli.verbose).await?);
        }
        ScenarioChoice::MessageFeed => {
            results.push(scenarios::test_message_feed(base_url, &expected, cli.verbose).await?);
        }
        ScenarioChoice::All => {
            results.push(scenarios::test_connection(base_url, &expected, cli.verbose).await?);
            results.push(scenarios::test_message_feed(base_url, &expected, cli.verbose).await?);
        }
    }

    println!("\n{}", "=== RESULTS ===".bright_white().bold());
    print_test_summary(&results);

    let all_passed = results.iter().all(|r| r.passed);

    if all_passed {
        println!("\n{}", "All tests passed! ✓".bright_green().bold());
    } else {
        println!("\n{}", "Some tests failed! ✗".bright_red().bold());
    }

    std::process::exit(if all_passed { 0 } else { 1 });
}
