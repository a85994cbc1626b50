use anyhow::Result;
use colored::*;
use domain::{
    message_element_id, Document, Dom, RendererState, StreamingListRenderer, LIST_ID, MAIN_REGION_ID,
};
use service::config::render_payload;
use std::time::Instant;

use crate::output::{print_rendered_list, TestResult};
use crate::sse_client::{Connection, RunOutcome};

/// What the fixture feed is expected to deliver.
#[derive(Debug, Clone)]
pub struct FeedExpectation {
    pub count: u32,
    pub payload_template: String,
}

impl FeedExpectation {
    pub fn payload(&self, id: u32) -> String {
        render_payload(&self.payload_template, id)
    }
}

/// Connect to `<base_url>/sse` and render the whole feed into a fresh page.
pub async fn render_feed(
    base_url: &str,
) -> Result<(StreamingListRenderer<Document>, RunOutcome)> {
    let mut renderer = StreamingListRenderer::for_main_region(Document::with_main())?;
    let outcome = Connection::new(base_url).run(&mut renderer).await?;
    Ok((renderer, outcome))
}

pub async fn test_connection(
    base_url: &str,
    expected: &FeedExpectation,
    verbose: bool,
) -> Result<TestResult> {
    let start = Instant::now();

    println!("\n{}", "=== TEST: Connection ===".bright_cyan().bold());
    println!("{} Connecting to {}/sse...", "→".blue(), base_url);

    let (renderer, outcome) = render_feed(base_url).await?;
    if verbose {
        print_rendered_list(renderer.dom(), 10);
    }

    match check_connection(&renderer, &outcome, expected) {
        Ok(()) => {
            println!(
                "{} Stream opened, {} message(s) rendered, closed cleanly",
                "✓".green(),
                renderer.rendered_count()
            );
            Ok(TestResult::pass("connection", start.elapsed()))
        }
        Err(msg) => {
            println!("{} {}", "✗".red(), msg);
            Ok(TestResult::fail("connection", msg, start.elapsed()))
        }
    }
}

pub async fn test_message_feed(
    base_url: &str,
    expected: &FeedExpectation,
    verbose: bool,
) -> Result<TestResult> {
    let start = Instant::now();

    println!("\n{}", "=== TEST: Message Feed ===".bright_cyan().bold());
    println!(
        "{} Waiting for {} message(s) from {}/sse...",
        "→".blue(),
        expected.count,
        base_url
    );

    let (renderer, _outcome) = render_feed(base_url).await?;
    if verbose {
        print_rendered_list(renderer.dom(), 10);
    }

    match check_message_feed(renderer.dom(), expected) {
        Ok(()) => {
            println!("{} Every message rendered in order", "✓".green());
            Ok(TestResult::pass("message_feed", start.elapsed()))
        }
        Err(msg) => {
            println!("{} {}", "✗".red(), msg);
            Ok(TestResult::fail("message_feed", msg, start.elapsed()))
        }
    }
}

fn check_connection(
    renderer: &StreamingListRenderer<Document>,
    outcome: &RunOutcome,
    expected: &FeedExpectation,
) -> std::result::Result<(), String> {
    if let RunOutcome::Failed(e) = outcome {
        return Err(format!("Stream did not close cleanly: {e}"));
    }
    if renderer.state() != RendererState::Closed {
        return Err(format!("Renderer ended in state {:?}", renderer.state()));
    }

    let doc = renderer.dom();
    let lists = doc.count_by_id(LIST_ID);
    if lists != 1 {
        return Err(format!("Expected exactly one #{LIST_ID}, found {lists}"));
    }
    let list = doc.get_element_by_id(LIST_ID);
    let main = doc.get_element_by_id(MAIN_REGION_ID);
    if list.and_then(|l| doc.parent(l)) != main {
        return Err(format!("#{LIST_ID} is not attached under #{MAIN_REGION_ID}"));
    }

    let rendered = renderer.rendered_count();
    if rendered != u64::from(expected.count) {
        return Err(format!(
            "Expected {} message(s), rendered {}",
            expected.count, rendered
        ));
    }
    Ok(())
}

fn check_message_feed(doc: &Document, expected: &FeedExpectation) -> std::result::Result<(), String> {
    let list = doc
        .get_element_by_id(LIST_ID)
        .ok_or_else(|| format!("#{LIST_ID} was never created"))?;
    let items = doc.children(list);
    if items.len() != expected.count as usize {
        return Err(format!(
            "Expected {} item(s), found {}",
            expected.count,
            items.len()
        ));
    }

    for (n, item) in (0..expected.count).zip(items) {
        let id = message_element_id(u64::from(n));
        if doc.element_id(*item) != Some(id.as_str()) {
            return Err(format!(
                "Item {n} has id {:?}, expected {id}",
                doc.element_id(*item)
            ));
        }
        let payload = expected.payload(n);
        if doc.text_content(*item) != Some(payload.as_str()) {
            return Err(format!(
                "#{id} has text {:?}, expected {payload:?}",
                doc.text_content(*item)
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::{config::Config, AppState};
    use tokio::net::TcpListener;

    async fn spawn_fixture(feed_size: u32) -> String {
        let config = Config::from_args(["--feed-size", feed_size.to_string().as_str()]).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(web::serve(listener, AppState::new(config)));
        format!("http://{addr}")
    }

    fn expectation(count: u32) -> FeedExpectation {
        FeedExpectation {
            count,
            payload_template: "message {id}".to_string(),
        }
    }

    #[tokio::test]
    async fn test_connection_scenario_passes_against_fixture() {
        let base_url = spawn_fixture(20).await;
        let result = test_connection(&base_url, &expectation(20), false)
            .await
            .unwrap();
        assert!(result.passed, "{:?}", result.message);
    }

    #[tokio::test]
    async fn test_message_feed_scenario_passes_against_fixture() {
        let base_url = spawn_fixture(255).await;
        let result = test_message_feed(&base_url, &expectation(255), true)
            .await
            .unwrap();
        assert!(result.passed, "{:?}", result.message);
    }

    #[tokio::test]
    async fn test_empty_feed_leaves_empty_list() {
        let base_url = spawn_fixture(0).await;
        let (renderer, outcome) = render_feed(&base_url).await.unwrap();

        assert_eq!(outcome, RunOutcome::Closed);
        let doc = renderer.dom();
        let list = doc.get_element_by_id(LIST_ID).unwrap();
        assert!(doc.children(list).is_empty());
        assert!(doc.get_element_by_id("message-0").is_none());
    }

    #[tokio::test]
    async fn test_count_mismatch_fails_scenario() {
        let base_url = spawn_fixture(3).await;
        let result = test_connection(&base_url, &expectation(4), false)
            .await
            .unwrap();
        assert!(!result.passed);
        assert_eq!(
            result.message.as_deref(),
            Some("Expected 4 message(s), rendered 3")
        );
    }

    #[tokio::test]
    async fn test_leading_space_payload_is_rendered_verbatim() {
        let config = Config::from_args(["--feed-size", "3"])
            .unwrap()
            .set_feed_payload(" lead {id}");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(web::serve(listener, AppState::new(config)));
        let expected = FeedExpectation {
            count: 3,
            payload_template: " lead {id}".to_string(),
        };

        let result = test_message_feed(&format!("http://{addr}"), &expected, false)
            .await
            .unwrap();

        assert!(result.passed, "{:?}", result.message);
    }

    #[tokio::test]
    async fn test_payload_mismatch_fails_scenario() {
        let base_url = spawn_fixture(2).await;
        let expected = FeedExpectation {
            count: 2,
            payload_template: "this is some data".to_string(),
        };
        let result = test_message_feed(&base_url, &expected, false).await.unwrap();
        assert!(!result.passed);
        assert!(result.message.unwrap().starts_with("#message-0 has text"));
    }
}
