//! The closed enumeration of node kinds.
//!
//! Every step a flow can contain is one of these six kinds. The enumeration
//! is closed by design: `default_data`, `validate`, and the editor field-set
//! logic are all exhaustive matches, so adding a kind is a compile-checked,
//! single-point change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FlowError;

/// The kind of a flow node.
///
/// Serialized lowercase (`"trigger"`, `"message"`, ...) to match the wire
/// format under the node's `type` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// The flow's entry point. Accepts no incoming edges.
    Trigger,
    /// An outbound text message.
    Message,
    /// An outbound media attachment (image/video/audio/document).
    Media,
    /// A timed wait, interpreted by the external runtime.
    Delay,
    /// An AI-generated reply.
    Ai,
    /// A conditional branch with "true" and "false" output handles.
    Conditional,
}

impl NodeKind {
    /// All kinds, in palette order.
    pub const ALL: [NodeKind; 6] = [
        NodeKind::Trigger,
        NodeKind::Message,
        NodeKind::Media,
        NodeKind::Delay,
        NodeKind::Ai,
        NodeKind::Conditional,
    ];

    /// Parses a kind from its wire string.
    ///
    /// Kind strings typically arrive untyped from a join with external data,
    /// so parsing is checked here rather than assumed by callers.
    pub fn parse(s: &str) -> Result<NodeKind, FlowError> {
        NodeKind::from_str(s)
    }

    /// Returns the lowercase wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Trigger => "trigger",
            NodeKind::Message => "message",
            NodeKind::Media => "media",
            NodeKind::Delay => "delay",
            NodeKind::Ai => "ai",
            NodeKind::Conditional => "conditional",
        }
    }

    /// Returns `true` if nodes of this kind may carry an incoming edge.
    ///
    /// Only `trigger` nodes refuse incoming edges: they are flow entry
    /// points.
    pub fn accepts_input(&self) -> bool {
        !matches!(self, NodeKind::Trigger)
    }

    /// The output handle set this kind emits.
    ///
    /// Conditional nodes emit two named handles, `"true"` and `"false"`;
    /// every other kind emits a single unnamed handle (`None`).
    pub fn output_handles(&self) -> &'static [Option<&'static str>] {
        match self {
            NodeKind::Conditional => &[Some("true"), Some("false")],
            _ => &[None],
        }
    }

    /// Returns `true` if `handle` is a legal source handle for this kind.
    pub fn accepts_handle(&self, handle: Option<&str>) -> bool {
        self.output_handles().iter().any(|h| *h == handle)
    }
}

impl FromStr for NodeKind {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trigger" => Ok(NodeKind::Trigger),
            "message" => Ok(NodeKind::Message),
            "media" => Ok(NodeKind::Media),
            "delay" => Ok(NodeKind::Delay),
            "ai" => Ok(NodeKind::Ai),
            "conditional" => Ok(NodeKind::Conditional),
            other => Err(FlowError::UnknownKind { kind: other.into() }),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrip_all_kinds() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::parse(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        let err = NodeKind::parse("carousel").unwrap_err();
        assert!(matches!(err, FlowError::UnknownKind { .. }));
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert!(NodeKind::parse("Trigger").is_err());
    }

    #[test]
    fn only_trigger_refuses_input() {
        assert!(!NodeKind::Trigger.accepts_input());
        for kind in NodeKind::ALL {
            if kind != NodeKind::Trigger {
                assert!(kind.accepts_input(), "{} should accept input", kind);
            }
        }
    }

    #[test]
    fn conditional_emits_two_named_handles() {
        assert_eq!(
            NodeKind::Conditional.output_handles(),
            &[Some("true"), Some("false")]
        );
        assert!(NodeKind::Conditional.accepts_handle(Some("true")));
        assert!(NodeKind::Conditional.accepts_handle(Some("false")));
        assert!(!NodeKind::Conditional.accepts_handle(None));
        assert!(!NodeKind::Conditional.accepts_handle(Some("maybe")));
    }

    #[test]
    fn non_conditional_emits_single_unnamed_handle() {
        for kind in NodeKind::ALL {
            if kind != NodeKind::Conditional {
                assert_eq!(kind.output_handles(), &[None]);
                assert!(kind.accepts_handle(None));
                assert!(!kind.accepts_handle(Some("true")));
            }
        }
    }

    #[test]
    fn serde_uses_lowercase_wire_names() {
        let json = serde_json::to_string(&NodeKind::Conditional).unwrap();
        assert_eq!(json, "\"conditional\"");
        let back: NodeKind = serde_json::from_str("\"media\"").unwrap();
        assert_eq!(back, NodeKind::Media);
    }
}
