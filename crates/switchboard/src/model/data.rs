//! Serializable snapshot of a state machine.
//!
//! This is the shape diagrams are loaded from and saved to:
//!
//! ```json
//! {
//!   "states": [
//!     {
//!       "id": "s1",
//!       "type": "choice",
//!       "name": "Pick one",
//!       "layout": { "x": 20.0, "y": 40.0 },
//!       "endpoints": [
//!         { "id": "s1-entry", "category": "entry_endpoint", "role": "target" }
//!       ]
//!     }
//!   ],
//!   "connections": [{ "source": "s1-c1", "target": "s2-entry" }],
//!   "entry_target": "s1-entry"
//! }
//! ```

use serde::{Deserialize, Serialize};

use switchboard_core::{geometry::Point, identifier::Id};

use super::{Cardinality, Endpoint, EndpointRole, Routing, State, StateMachine};
use crate::error::SwitchboardError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramData {
    #[serde(default)]
    pub states: Vec<StateData>,
    #[serde(default)]
    pub connections: Vec<ConnectionData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_target: Option<Id>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateData {
    pub id: Id,
    #[serde(rename = "type")]
    pub kind: Id,
    /// State collection; the first collection of the editor when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<Id>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutData>,
    #[serde(default)]
    pub endpoints: Vec<EndpointData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutData {
    pub x: f32,
    pub y: f32,
}

impl From<Point> for LayoutData {
    fn from(point: Point) -> Self {
        Self {
            x: point.x(),
            y: point.y(),
        }
    }
}

impl From<LayoutData> for Point {
    fn from(layout: LayoutData) -> Self {
        Point::new(layout.x, layout.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointData {
    pub id: Id,
    pub category: Id,
    #[serde(default)]
    pub role: EndpointRole,
    #[serde(default)]
    pub cardinality: Cardinality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub ordinal: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionData {
    pub source: Id,
    pub target: Id,
}

impl From<&Endpoint> for EndpointData {
    fn from(endpoint: &Endpoint) -> Self {
        Self {
            id: endpoint.id(),
            category: endpoint.category(),
            role: endpoint.role(),
            cardinality: endpoint.cardinality(),
            label: endpoint.label().map(str::to_string),
            ordinal: endpoint.ordinal(),
        }
    }
}

impl From<&EndpointData> for Endpoint {
    fn from(data: &EndpointData) -> Self {
        let endpoint = Endpoint::new(data.id, data.category)
            .with_role(data.role)
            .with_cardinality(data.cardinality)
            .with_ordinal(data.ordinal);
        match &data.label {
            Some(label) => endpoint.with_label(label.clone()),
            None => endpoint,
        }
    }
}

impl StateData {
    /// Builds the model state described by this record.
    ///
    /// # Errors
    ///
    /// Returns an error if two endpoints share an id.
    pub fn to_state(&self) -> Result<State, SwitchboardError> {
        let mut state = State::new(self.id, self.kind).with_name(self.name.clone());
        if let Some(layout) = self.layout {
            state = state.with_layout(layout.into());
        }
        self.endpoints
            .iter()
            .try_fold(state, |state, endpoint| state.with_endpoint(endpoint.into()))
    }

    fn from_state(state: &State, collection: Option<Id>) -> Self {
        Self {
            id: state.id(),
            kind: state.kind(),
            collection,
            name: state.name().to_string(),
            layout: state.layout().map(LayoutData::from),
            endpoints: state.endpoints().values().map(EndpointData::from).collect(),
        }
    }
}

impl StateMachine {
    /// Captures the machine as a serializable snapshot.
    pub fn to_data(&self) -> DiagramData {
        DiagramData {
            states: self
                .states()
                .values()
                .map(|state| StateData::from_state(state, self.state_collection(state.id())))
                .collect(),
            connections: self
                .connections()
                .values()
                .map(|connection| ConnectionData {
                    source: connection.source(),
                    target: connection.target(),
                })
                .collect(),
            entry_target: self.entry_point().and_then(|entry| entry.target()),
        }
    }

    /// Adds everything described by `data`. States without a collection go
    /// to `default_collection`. Connections are routed like newly drawn
    /// links.
    ///
    /// # Errors
    ///
    /// Returns an error if a record conflicts with the machine or a
    /// connection is refused.
    pub fn load(&mut self, data: &DiagramData, default_collection: Id) -> Result<(), SwitchboardError> {
        for state in &data.states {
            let collection = state.collection.unwrap_or(default_collection);
            self.add_state(collection, state.to_state()?)?;
        }
        for connection in &data.connections {
            if let Routing::Rejected(reason) = self.connect(connection.source, connection.target)? {
                return Err(SwitchboardError::Graph(format!(
                    "connection `{}` -> `{}` refused: {reason}",
                    connection.source, connection.target
                )));
            }
        }
        if let Some(target) = data.entry_target {
            self.set_entry_target(target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CategoryRule, ConnectionRule, EntryPoint};

    const DOCUMENT: &str = r#"{
        "states": [
            {
                "id": "s1",
                "type": "choice",
                "layout": { "x": 10.0, "y": 20.0 },
                "endpoints": [
                    { "id": "s1-c1", "category": "choice_endpoints", "role": "source", "label": "Yes" }
                ]
            },
            {
                "id": "s2",
                "type": "end",
                "endpoints": [
                    { "id": "s2-entry", "category": "entry_endpoint", "role": "target" }
                ]
            }
        ],
        "connections": [{ "source": "s1-c1", "target": "s2-entry" }],
        "entry_target": "s2-entry"
    }"#;

    fn machine() -> StateMachine {
        let mut machine = StateMachine::new();
        machine.add_state_collection(Id::new("states")).unwrap();
        machine
            .add_connection_collection(ConnectionRule::new(
                Id::new("links"),
                CategoryRule::new(&["choice_endpoints"], &["entry_endpoint"]),
            ))
            .unwrap();
        machine.set_entry_point(EntryPoint::new(Id::new("start"), &[]));
        machine
    }

    #[test]
    fn test_load_builds_machine() {
        let data: DiagramData = serde_json::from_str(DOCUMENT).unwrap();
        let mut machine = machine();
        machine.load(&data, Id::new("states")).unwrap();

        assert_eq!(machine.states().len(), 2);
        assert_eq!(machine.state(Id::new("s1")).unwrap().layout(), Some(Point::new(10.0, 20.0)));
        assert_eq!(
            machine.endpoint(Id::new("s1-c1")).unwrap().label(),
            Some("Yes")
        );
        assert!(machine.connection(Id::new("s1-c1-s2-entry")).is_some());
        assert_eq!(machine.entry_point().unwrap().target(), Some(Id::new("s2-entry")));
    }

    #[test]
    fn test_snapshot_survives_reload() {
        let data: DiagramData = serde_json::from_str(DOCUMENT).unwrap();
        let mut first = machine();
        first.load(&data, Id::new("states")).unwrap();
        let snapshot = first.to_data();

        let mut second = machine();
        second.load(&snapshot, Id::new("states")).unwrap();
        assert_eq!(second.to_data(), snapshot);
        assert_eq!(snapshot.states[0].collection, Some(Id::new("states")));
    }

    #[test]
    fn test_refused_connection_fails_load() {
        let mut data: DiagramData = serde_json::from_str(DOCUMENT).unwrap();
        data.connections = vec![ConnectionData {
            source: Id::new("s2-entry"),
            target: Id::new("s1-c1"),
        }];

        let result = machine().load(&data, Id::new("states"));
        assert!(matches!(result, Err(SwitchboardError::Graph(_))));
    }
}
