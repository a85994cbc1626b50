use colored::*;
use domain::{Document, Dom, LIST_ID};
use std::time::Duration;

#[derive(Debug)]
pub struct TestResult {
    pub scenario: String,
    pub passed: bool,
    pub message: Option<String>,
    pub duration: Duration,
}

impl TestResult {
    pub fn pass(scenario: &str, duration: Duration) -> Self {
        Self {
            scenario: scenario.to_string(),
            passed: true,
            message: None,
            duration,
        }
    }

    pub fn fail(scenario: &str, message: String, duration: Duration) -> Self {
        Self {
            scenario: scenario.to_string(),
            passed: false,
            message: Some(message),
            duration,
        }
    }
}

/// Print the rendered list items, one per line, eliding the middle of long lists.
pub fn print_rendered_list(doc: &Document, max_items: usize) {
    let Some(list) = doc.get_element_by_id(LIST_ID) else {
        println!("   {}", "(no list rendered)".dimmed());
        return;
    };

    let items = doc.children(list);
    println!("   {} item(s) in #{}", items.len(), LIST_ID);
    for (i, item) in items.iter().enumerate() {
        if items.len() > max_items && i == max_items / 2 {
            println!("   {}", "...".dimmed());
        }
        if items.len() > max_items && i >= max_items / 2 && i < items.len() - max_items / 2 {
            continue;
        }
        println!(
            "   #{} {}",
            doc.element_id(*item).unwrap_or_default().yellow(),
            doc.text_content(*item).unwrap_or_default().dimmed()
        );
    }
}

pub fn print_test_summary(results: &[TestResult]) {
    println!("\n{}", "=== TEST SUMMARY ===".bright_white().bold());

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = total - passed;

    for result in results {
        let status = if result.passed {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };

        println!("[{}] {} ({:?})", status, result.scenario, result.duration);

        if let Some(msg) = &result.message {
            println!("      {}", msg.dimmed());
        }
    }

    println!(
        "\n{}: {} passed, {} failed",
        "Results".bold(),
        passed.to_string().green(),
        failed.to_string().red()
    );
}
