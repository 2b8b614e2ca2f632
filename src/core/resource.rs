//! Resource and payload types exchanged with the catalog and the opener.
//!
//! Field names follow the OSLC delegated-dialog JSON convention
//! (`oslc:label`, `rdf:resource`, `oslc:results`), so serde does all of the
//! wire mapping.

use serde::{Deserialize, Serialize};

use super::error::DialogError;

/// Prefix every response string carries, whatever the transport.
pub const RESPONSE_PREFIX: &str = "oslc-response:";

/// Byte-exact cancellation response openers compare against.
pub const CANCEL_RESPONSE: &str = r#"oslc-response:{ "oslc:results": [ ]}"#;

// ───────────────────────────────────────── resource ──────────

/// A catalog entry: a URI plus a human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "oslc:label")]
    pub label: String,
    #[serde(rename = "rdf:resource")]
    pub uri: String,
}

impl Resource {
    pub fn new(label: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            uri: uri.into(),
        }
    }
}

// ───────────────────────────────────────── payloads ──────────

/// `{"oslc:results": [...]}` — the shape of search replies, selections and
/// cancellations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPayload {
    #[serde(rename = "oslc:results")]
    pub results: Vec<Resource>,
}

impl SelectionPayload {
    pub fn new(results: Vec<Resource>) -> Self {
        Self { results }
    }

    /// Parse a catalog search reply.
    pub fn from_json(body: &str) -> Result<Self, DialogError> {
        Ok(serde_json::from_str(body)?)
    }
}

/// What the dialog hands to the opener.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    /// Search / select / cancel paths.
    Selection(SelectionPayload),
    /// A created resource, forwarded exactly as the catalog returned it.
    Raw(serde_json::Value),
    /// Empty result set sent by cancel.
    Cancel,
}

impl ResponsePayload {
    /// Render the full `oslc-response:<JSON>` string.
    ///
    /// Raw payloads are pretty-printed with two-space indentation; selection
    /// payloads are compact.
    pub fn encode(&self) -> Result<String, DialogError> {
        let json = match self {
            Self::Selection(selection) => serde_json::to_string(selection)?,
            Self::Raw(value) => serde_json::to_string_pretty(value)?,
            Self::Cancel => return Ok(CANCEL_RESPONSE.to_string()),
        };
        Ok(format!("{RESPONSE_PREFIX}{json}"))
    }
}

impl From<SelectionPayload> for ResponsePayload {
    fn from(selection: SelectionPayload) -> Self {
        Self::Selection(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_reply_keeps_server_order() {
        let body = r#"{"oslc:results":[
            {"oslc:label":"REQ-2 / Brakes","rdf:resource":"http://x/req/2"},
            {"oslc:label":"REQ-1 / Lights","rdf:resource":"http://x/req/1"}
        ]}"#;
        let payload = SelectionPayload::from_json(body).unwrap();
        assert_eq!(
            payload.results,
            vec![
                Resource::new("REQ-2 / Brakes", "http://x/req/2"),
                Resource::new("REQ-1 / Lights", "http://x/req/1"),
            ]
        );
    }

    #[test]
    fn search_reply_without_results_key_is_malformed() {
        let err = SelectionPayload::from_json(r#"{"results":[]}"#).unwrap_err();
        assert!(matches!(err, DialogError::MalformedResponse(_)));
    }

    #[test]
    fn empty_selection_encodes_to_empty_results() {
        let encoded = ResponsePayload::from(SelectionPayload::default())
            .encode()
            .unwrap();
        assert_eq!(encoded, r#"oslc-response:{"oslc:results":[]}"#);
    }

    #[test]
    fn cancel_uses_the_legacy_literal() {
        let encoded = ResponsePayload::Cancel.encode().unwrap();
        assert_eq!(encoded, r#"oslc-response:{ "oslc:results": [ ]}"#);
        let json = encoded.strip_prefix(RESPONSE_PREFIX).unwrap();
        let parsed: SelectionPayload = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, SelectionPayload::default());
    }

    #[test]
    fn labels_with_quotes_are_escaped() {
        let payload = SelectionPayload::new(vec![Resource::new(r#"say "hi""#, "u")]);
        let encoded = ResponsePayload::from(payload).encode().unwrap();
        let json = encoded.strip_prefix(RESPONSE_PREFIX).unwrap();
        let back: SelectionPayload = serde_json::from_str(json).unwrap();
        assert_eq!(back.results[0].label, r#"say "hi""#);
    }

    #[test]
    fn raw_payload_is_pretty_and_keeps_key_order() {
        let value = json!({"z": 1, "a": {"b": true}});
        let encoded = ResponsePayload::Raw(value).encode().unwrap();
        assert_eq!(
            encoded,
            "oslc-response:{\n  \"z\": 1,\n  \"a\": {\n    \"b\": true\n  }\n}"
        );
    }
}
