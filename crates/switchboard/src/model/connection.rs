use switchboard_core::identifier::Id;

/// A directed edge between two endpoints.
///
/// The id is derived from the endpoint pair, so a pair can only ever be
/// connected once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection {
    id: Id,
    source: Id,
    target: Id,
}

impl Connection {
    pub fn new(source: Id, target: Id) -> Self {
        Self {
            id: Id::connection(source, target),
            source,
            target,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    /// Returns `true` if `endpoint` is either end of the connection.
    pub fn touches(&self, endpoint: Id) -> bool {
        self.source == endpoint || self.target == endpoint
    }
}
