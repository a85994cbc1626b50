//! Structured interpretation of message payloads.
//!
//! The renderer treats every payload as opaque text. Callers that expect a
//! structured payload parse it here, and failures surface as
//! `PayloadErrorKind` errors rather than protocol violations.
use crate::error::Error;
use events::MessageEvent;
use serde::de::DeserializeOwned;

pub fn parse_json_payload<T: DeserializeOwned>(message: &MessageEvent) -> Result<T, Error> {
    Ok(serde_json::from_str(&message.data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, PayloadErrorKind};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Tick {
        seq: u32,
    }

    #[test]
    fn test_parse_json_payload() {
        let tick: Tick = parse_json_payload(&MessageEvent::new(r#"{"seq": 3}"#)).unwrap();
        assert_eq!(tick, Tick { seq: 3 });
    }

    #[test]
    fn test_parse_json_payload_rejects_plain_text() {
        let err = parse_json_payload::<Tick>(&MessageEvent::new("this is some data")).unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Payload(PayloadErrorKind::Json)
        );
    }
}
