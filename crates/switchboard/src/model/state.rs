//! States: the nodes of a state machine.

use switchboard_core::{
    geometry::Point,
    group::LookupGroup,
    identifier::Id,
    lookup::{Comparator, Lookup},
};

use super::Endpoint;
use crate::error::SwitchboardError;

/// A node of the state machine.
///
/// A state owns its endpoints, grouped by category. Each category is an
/// ordinal-sorted member of the state's endpoint [`LookupGroup`], so
/// endpoint ids are unique within the state and "which category holds
/// endpoint E" has a single answer.
#[derive(Debug)]
pub struct State {
    id: Id,
    kind: Id,
    name: String,
    layout: Option<Point>,
    endpoints: LookupGroup<Id, Endpoint>,
}

impl State {
    /// Creates a state of type `kind` with no endpoints and no saved layout.
    pub fn new(id: Id, kind: Id) -> Self {
        Self {
            id,
            kind,
            name: String::new(),
            layout: None,
            endpoints: LookupGroup::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the diagram-local position of the state's top-left corner.
    pub fn with_layout(mut self, layout: Point) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Adds `endpoint` while building the state.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint id is already taken on this state.
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Result<Self, SwitchboardError> {
        self.insert_endpoint(endpoint)?;
        Ok(self)
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// The state's type tag, used to pick its view template.
    pub fn kind(&self) -> Id {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> Option<Point> {
        self.layout
    }

    pub(crate) fn set_layout(&mut self, layout: Point) {
        self.layout = Some(layout);
    }

    /// The state's endpoints, one group member per category.
    pub fn endpoints(&self) -> &LookupGroup<Id, Endpoint> {
        &self.endpoints
    }

    pub fn endpoint(&self, id: Id) -> Option<&Endpoint> {
        self.endpoints.get(&id)
    }

    /// Endpoints of a single category in ordinal order.
    pub fn endpoints_in(&self, category: Id) -> impl Iterator<Item = &Endpoint> {
        self.endpoints
            .member(category)
            .into_iter()
            .flat_map(|lookup| lookup.values())
    }

    pub(crate) fn insert_endpoint(&mut self, mut endpoint: Endpoint) -> Result<(), SwitchboardError> {
        let category = endpoint.category();
        if !self.endpoints.has_member(category) {
            self.endpoints.subscribe(category, category_lookup())?;
        }
        endpoint.bind_to(self.id);
        self.endpoints.add(category, endpoint.id(), endpoint)?;
        Ok(())
    }

    pub(crate) fn take_endpoint(&mut self, id: Id) -> Result<Endpoint, SwitchboardError> {
        Ok(self.endpoints.remove(&id)?)
    }

    /// Reorders a category, renumbering the ordinals of its endpoints.
    pub(crate) fn rearrange_endpoints(
        &mut self,
        category: Id,
        order: &[Id],
    ) -> Result<(), SwitchboardError> {
        Ok(self.endpoints.rearrange(category, order)?)
    }
}

fn category_lookup() -> Lookup<Id, Endpoint> {
    Lookup::new()
        .with_comparator(Comparator::by_field(Endpoint::ordinal))
        .with_arranger(|endpoint: &mut Endpoint, ordinal| endpoint.set_ordinal(ordinal))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(id: &str, ordinal: usize) -> Endpoint {
        Endpoint::new(Id::new(id), Id::new("choice_endpoints")).with_ordinal(ordinal)
    }

    #[test]
    fn test_endpoints_are_bound_and_grouped() {
        let state = State::new(Id::new("s1"), Id::new("choice"))
            .with_endpoint(Endpoint::new(Id::new("s1-entry"), Id::new("entry_endpoint")))
            .unwrap()
            .with_endpoint(choice("s1-c1", 0))
            .unwrap();

        let endpoint = state.endpoint(Id::new("s1-c1")).unwrap();
        assert_eq!(endpoint.state(), Id::new("s1"));
        assert_eq!(
            state.endpoints().owner_of(&Id::new("s1-entry")),
            Some(Id::new("entry_endpoint"))
        );
        assert_eq!(state.endpoints().len(), 2);
    }

    #[test]
    fn test_duplicate_endpoint_fails() {
        let result = State::new(Id::new("s1"), Id::new("choice"))
            .with_endpoint(choice("s1-c1", 0))
            .unwrap()
            .with_endpoint(choice("s1-c1", 1));
        assert!(matches!(result, Err(SwitchboardError::Collection(_))));
    }

    #[test]
    fn test_categories_sort_by_ordinal() {
        let state = State::new(Id::new("s1"), Id::new("choice"))
            .with_endpoint(choice("s1-c2", 2))
            .unwrap()
            .with_endpoint(choice("s1-c0", 0))
            .unwrap()
            .with_endpoint(choice("s1-c1", 1))
            .unwrap();

        let order: Vec<_> = state
            .endpoints_in(Id::new("choice_endpoints"))
            .map(Endpoint::id)
            .collect();
        assert_eq!(order, vec![Id::new("s1-c0"), Id::new("s1-c1"), Id::new("s1-c2")]);
    }

    #[test]
    fn test_rearrange_renumbers_ordinals() {
        let mut state = State::new(Id::new("s1"), Id::new("choice"))
            .with_endpoint(choice("s1-a", 0))
            .unwrap()
            .with_endpoint(choice("s1-b", 1))
            .unwrap()
            .with_endpoint(choice("s1-c", 2))
            .unwrap();

        state
            .rearrange_endpoints(Id::new("choice_endpoints"), &[Id::new("s1-c")])
            .unwrap();

        let ordered: Vec<_> = state
            .endpoints_in(Id::new("choice_endpoints"))
            .map(|endpoint| (endpoint.id(), endpoint.ordinal()))
            .collect();
        assert_eq!(
            ordered,
            vec![(Id::new("s1-c"), 0), (Id::new("s1-a"), 1), (Id::new("s1-b"), 2)]
        );
    }

    #[test]
    fn test_unknown_category_is_empty() {
        let state = State::new(Id::new("s1"), Id::new("end"));
        assert_eq!(state.endpoints_in(Id::new("nothing")).count(), 0);
    }
}
