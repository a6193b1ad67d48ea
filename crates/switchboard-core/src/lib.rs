//! Switchboard Core Types and Definitions
//!
//! This crate provides the foundational building blocks shared by the
//! Switchboard diagram editors:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Keyed collections**: ordered, event-emitting [`lookup::Lookup`] and the
//!   composing [`group::LookupGroup`]
//! - **Events**: typed event channels ([`events`] module)
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Colors**: validated CSS colors for snapshots ([`color::Color`])

pub mod color;
pub mod error;
pub mod events;
pub mod geometry;
pub mod group;
pub mod identifier;
pub mod lookup;
