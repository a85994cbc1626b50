use async_stream::stream;
use axum::body::Body;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use events::CLOSE_EVENT_TYPE;
use log::*;
use service::AppState;
use ::sse::ServerSentEvent;
use std::convert::Infallible;
use std::time::Duration;

pub(crate) const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// Streams the configured feed: an optional retry hint, `feed_size` numbered
/// data events, then a named `close` event, after which the body ends.
pub(crate) async fn sse_handler(State(app_state): State<AppState>) -> Response {
    let config = app_state.config;
    debug!(
        "Opening SSE feed of {} event(s), {}ms apart",
        config.feed_size, config.feed_interval_ms
    );

    let interval = Duration::from_millis(config.feed_interval_ms);
    let stream = stream! {
        if let Some(retry) = config.retry_millis {
            yield frame(ServerSentEvent::builder().retry(retry.to_string()).build());
        }

        for id in 0..config.feed_size {
            if id > 0 && !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }
            yield frame(
                ServerSentEvent::builder()
                    .id(id.to_string())
                    .data(config.feed_payload(id))
                    .build(),
            );
        }

        yield frame(ServerSentEvent::builder().event(CLOSE_EVENT_TYPE).build());
        debug!("SSE feed complete, closing body");
    };

    Response::builder()
        .header(CONTENT_TYPE, EVENT_STREAM_CONTENT_TYPE)
        .header(CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(stream))
        .unwrap_or_else(|e| {
            error!("Failed to build SSE response: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}

fn frame(event: ServerSentEvent<'_>) -> Result<String, Infallible> {
    Ok(event.to_string())
}
