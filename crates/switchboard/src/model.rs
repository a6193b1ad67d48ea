//! The diagram model: states, their endpoints and the connections between
//! them, independent of any drawing.

mod acceptance;
mod connection;
mod data;
mod endpoint;
mod entry;
mod machine;
mod state;

pub use acceptance::{Acceptance, CategoryRule, ConnectionRule, LinkCandidate};
pub use connection::Connection;
pub use data::{ConnectionData, DiagramData, EndpointData, LayoutData, StateData};
pub use endpoint::{Cardinality, Endpoint, EndpointRole};
pub use entry::{EntryEvent, EntryPoint};
pub use machine::{RejectReason, Routing, StateMachine};
pub use state::State;
