// Testing Tools Library
//
// Drives the streaming list renderer against a live SSE endpoint.
// Currently includes:
// - sse_client: SSE transport over reqwest that delivers lifecycle events
// - scenarios: end-to-end checks of the rendered document
// - sse-test-client: CLI wrapper around the scenarios

pub mod output;
pub mod scenarios;
pub mod sse_client;
