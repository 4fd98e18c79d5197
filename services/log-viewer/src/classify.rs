// services/log-viewer/src/classify.rs
//
// Flow classification of proxy log messages by their bracketed tags

/// Which leg of a proxied exchange a message describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    Request,
    Response,
    Stream,
    Error,
    Unclassified,
}

/// Checked in order; the first tag contained in the message wins.
const FLOW_TAGS: [(&str, FlowKind); 4] = [
    ("[REQUEST", FlowKind::Request),
    ("[RESPONSE", FlowKind::Response),
    ("[STREAM", FlowKind::Stream),
    ("[ERROR", FlowKind::Error),
];

pub fn classify(message: &str) -> FlowKind {
    FLOW_TAGS
        .iter()
        .find(|(tag, _)| message.contains(tag))
        .map(|(_, kind)| *kind)
        .unwrap_or(FlowKind::Unclassified)
}

/// Human-readable direction of travel, relative to the upstream service.
pub fn flow_label(kind: FlowKind, upstream: &str) -> Option<String> {
    match kind {
        FlowKind::Request => Some(format!("Client → {}", upstream)),
        FlowKind::Response => Some(format!("{} → Client", upstream)),
        FlowKind::Stream => Some(format!("{} ⟿ Client", upstream)),
        FlowKind::Error | FlowKind::Unclassified => None,
    }
}

impl FlowKind {
    pub fn glyph(&self) -> &'static str {
        match self {
            FlowKind::Request => "➜",
            FlowKind::Response => "⮐",
            FlowKind::Stream => "≈",
            FlowKind::Error => "✗",
            FlowKind::Unclassified => " ",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_tags() {
        assert_eq!(classify("[REQUEST ab12] POST /v1beta/models"), FlowKind::Request);
        assert_eq!(classify("[RESPONSE ab12] Status: 200"), FlowKind::Response);
        assert_eq!(classify("[STREAM ab12] chunk 3"), FlowKind::Stream);
        assert_eq!(classify("[ERROR ab12] Status: 500"), FlowKind::Error);
        assert_eq!(classify("websocket client connected"), FlowKind::Unclassified);
        assert_eq!(classify(""), FlowKind::Unclassified);
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(classify("[RESPONSE x] after [REQUEST x]"), FlowKind::Request);
        assert_eq!(classify("[STREAM ERROR ab12] Status: 429"), FlowKind::Stream);
        assert_eq!(classify("[ERROR x] [STREAM x]"), FlowKind::Stream);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let message = "[RESPONSE 9] [ERROR 9] upstream failed";
        let first = classify(message);
        for _ in 0..10 {
            assert_eq!(classify(message), first);
        }
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        assert_eq!(classify("[request x]"), FlowKind::Unclassified);
    }

    #[test]
    fn test_flow_labels_use_upstream_name() {
        assert_eq!(
            flow_label(FlowKind::Request, "Gemini API").as_deref(),
            Some("Client → Gemini API")
        );
        assert_eq!(
            flow_label(FlowKind::Response, "Gemini API").as_deref(),
            Some("Gemini API → Client")
        );
        assert_eq!(
            flow_label(FlowKind::Stream, "Upstream").as_deref(),
            Some("Upstream ⟿ Client")
        );
        assert_eq!(flow_label(FlowKind::Error, "Upstream"), None);
        assert_eq!(flow_label(FlowKind::Unclassified, "Upstream"), None);
    }
}
