//! Ready-made schemas for the two editors built on the engine.
//!
//! - [`dialogue`] - Conversation flows: steps joined exit to entry, started
//!   from a `start` entry point.
//! - [`routing`] - Routing tables: channels feed routers, routers feed
//!   conversations.

use serde::Deserialize;

use switchboard_core::geometry::Size;

use crate::{
    model::{Cardinality, CategoryRule, EndpointRole},
    schema::{DiagramSchema, EndpointSlot, StateType},
    view::StateTemplate,
};

/// Which editor a diagram is built for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorKind {
    #[default]
    Dialogue,
    Routing,
}

impl EditorKind {
    pub fn schema(self) -> DiagramSchema {
        match self {
            Self::Dialogue => dialogue(),
            Self::Routing => routing(),
        }
    }
}

const DIALOGUE_STEPS: [&str; 4] = ["freetext", "send", "httpjson", "end"];

fn entry_slot() -> EndpointSlot {
    EndpointSlot::new("entry_endpoint", "entry", EndpointRole::Target)
}

fn step_type(exit: Option<EndpointSlot>) -> StateType {
    let template = StateTemplate::new(Size::new(160.0, 80.0))
        .with_endpoints("entry_endpoint", "entry")
        .with_endpoints("exit_endpoint", "exit")
        .with_endpoints("choice_endpoints", "choice");
    let state_type = StateType::new(template).with_slot(entry_slot());
    match exit {
        Some(slot) => state_type.with_slot(slot),
        None => state_type,
    }
}

/// The conversation flow editor.
///
/// Every step has an entry endpoint. Choices branch through their choice
/// endpoints, other steps (except `end`) continue through a single exit.
pub fn dialogue() -> DiagramSchema {
    let exit = EndpointSlot::new("exit_endpoint", "exit", EndpointRole::Source)
        .with_cardinality(Cardinality::Single);
    let choice = EndpointSlot::new("choice_endpoints", "choice-0", EndpointRole::Source)
        .with_cardinality(Cardinality::Single);

    let schema = DiagramSchema::new("dialogue")
        .with_state_collection("states")
        .with_state_type("choice", step_type(Some(choice)))
        .with_fallback_type(step_type(Some(exit.clone())));

    DIALOGUE_STEPS
        .iter()
        .fold(schema, |schema, kind| {
            let exit = (*kind != "end").then(|| exit.clone());
            schema.with_state_type(kind, step_type(exit))
        })
        .with_connection_collection(
            "choice_connections",
            CategoryRule::new(&["choice_endpoints", "exit_endpoint"], &["entry_endpoint"]),
        )
        .with_entry_point("start", &["entry_endpoint"])
}

fn routing_type(left: bool, right: bool) -> StateType {
    let template = StateTemplate::new(Size::new(200.0, 60.0))
        .with_endpoints("left", "left")
        .with_endpoints("right", "right");
    let mut state_type = StateType::new(template);
    if left {
        state_type = state_type.with_slot(EndpointSlot::new("left", "left", EndpointRole::Target));
    }
    if right {
        state_type =
            state_type.with_slot(EndpointSlot::new("right", "right", EndpointRole::Source));
    }
    state_type
}

/// The routing table editor.
///
/// Channels only send, conversations only receive and routers sit in
/// between. Links always run from a `right` endpoint to a `left` one.
pub fn routing() -> DiagramSchema {
    DiagramSchema::new("routing")
        .with_state_collection("channels")
        .with_state_collection("routers")
        .with_state_collection("conversations")
        .with_state_type("channel", routing_type(false, true))
        .with_state_type("router", routing_type(true, true))
        .with_state_type("conversation", routing_type(true, false))
        .with_fallback_type(routing_type(true, true))
        .with_connection_collection(
            "channel_routes",
            CategoryRule::new(&["right"], &["left"]).between_collections(&["channels"], &["routers"]),
        )
        .with_connection_collection(
            "router_routes",
            CategoryRule::new(&["right"], &["left"])
                .between_collections(&["routers"], &["conversations"]),
        )
}

#[cfg(test)]
mod tests {
    use switchboard_core::identifier::Id;

    use super::*;

    #[test]
    fn test_dialogue_step_endpoints() {
        let schema = dialogue();

        let send = schema.instantiate(Id::new("send"), Id::new("s1")).unwrap();
        assert!(send.endpoint(Id::new("s1-entry")).is_some());
        assert!(send.endpoint(Id::new("s1-exit")).is_some());

        let end = schema.instantiate(Id::new("end"), Id::new("s2")).unwrap();
        assert!(end.endpoint(Id::new("s2-exit")).is_none());

        let choice = schema.instantiate(Id::new("choice"), Id::new("s3")).unwrap();
        let branch = choice.endpoint(Id::new("s3-choice-0")).unwrap();
        assert_eq!(branch.category(), Id::new("choice_endpoints"));
        assert_eq!(branch.cardinality(), Cardinality::Single);
    }

    #[test]
    fn test_routing_collections() {
        let schema = routing();
        assert_eq!(schema.default_collection(), Some(Id::new("channels")));

        let channel = schema
            .instantiate(Id::new("channel"), Id::new("sms"))
            .unwrap();
        assert!(channel.endpoint(Id::new("sms-left")).is_none());
        assert!(channel.endpoint(Id::new("sms-right")).is_some());
    }

    #[test]
    fn test_kind_deserializes_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            kind: EditorKind,
        }
        let wrapper: Wrapper = serde_json::from_str(r#"{"kind": "routing"}"#).unwrap();
        assert_eq!(wrapper.kind, EditorKind::Routing);
        assert_eq!(wrapper.kind.schema().name(), Id::new("routing"));
    }
}
