//! SSE HTTP handler for the web layer.
//!
//! This module contains only the Axum handler for the `/sse` feed.
//! The wire format itself lives in the `sse` crate.

pub mod handler;
