//! Widgets for the nested records of a parent record.
//!
//! A parent exposes its nested records as named attributes (a state's
//! `entry_endpoint` or `choice_endpoints` members, for instance). A
//! [`SubviewSchema`] maps each attribute to the widget type that draws it,
//! and a [`SubviewCollectionGroup`] holds one [`SubviewCollection`] per
//! attribute of the schema.

use std::rc::Rc;

use indexmap::IndexMap;

use switchboard_core::{group::LookupGroup, identifier::Id, lookup::Lookup};

use super::{RemoveOptions, SyncReport, Tagged, ViewCollection, Widget, WidgetRegistry};
use crate::error::SwitchboardError;

/// One `{attribute, widget type}` pair of a subview schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubviewSchema {
    pub attribute: Id,
    pub widget_type: Id,
}

impl SubviewSchema {
    pub fn new(attribute: &str, widget_type: &str) -> Self {
        Self {
            attribute: Id::new(attribute),
            widget_type: Id::new(widget_type),
        }
    }
}

/// The views of one attribute of a parent record.
#[derive(Debug)]
pub struct SubviewCollection<R, W> {
    attribute: Id,
    views: ViewCollection<R, W>,
}

impl<R: Tagged, W: Widget> SubviewCollection<R, W> {
    pub fn new(schema: SubviewSchema, registry: Rc<WidgetRegistry<R, W>>) -> Self {
        Self {
            attribute: schema.attribute,
            views: ViewCollection::new(registry).with_widget_type(schema.widget_type),
        }
    }

    pub fn attribute(&self) -> Id {
        self.attribute
    }

    pub fn views(&self) -> &ViewCollection<R, W> {
        &self.views
    }

    pub fn get(&self, key: Id) -> Option<&W> {
        self.views.get(key)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn render(&mut self) {
        self.views.render();
    }

    /// Mirrors the attribute's records; a missing attribute counts as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if a view cannot be added or removed.
    pub fn sync(&mut self, records: Option<&Lookup<Id, R>>) -> Result<SyncReport, SwitchboardError> {
        match records {
            Some(records) => self.views.reconcile(records),
            None => self.views.reconcile(&Lookup::<Id, R>::new()),
        }
    }

    pub fn clear(&mut self, options: &RemoveOptions) {
        self.views.clear(options);
    }
}

/// One [`SubviewCollection`] per attribute of a schema.
#[derive(Debug)]
pub struct SubviewCollectionGroup<R, W> {
    members: IndexMap<Id, SubviewCollection<R, W>>,
}

impl<R: Tagged, W: Widget> SubviewCollectionGroup<R, W> {
    pub fn new(schema: &[SubviewSchema], registry: Rc<WidgetRegistry<R, W>>) -> Self {
        let members = schema
            .iter()
            .map(|entry| {
                (
                    entry.attribute,
                    SubviewCollection::new(*entry, Rc::clone(&registry)),
                )
            })
            .collect();
        Self { members }
    }

    pub fn member(&self, attribute: Id) -> Option<&SubviewCollection<R, W>> {
        self.members.get(&attribute)
    }

    /// Attributes in schema order.
    pub fn attributes(&self) -> impl Iterator<Item = Id> + '_ {
        self.members.keys().copied()
    }

    /// The attribute whose collection holds the view `key`.
    pub fn owner_of(&self, key: Id) -> Option<Id> {
        self.members
            .iter()
            .find(|(_, member)| member.get(key).is_some())
            .map(|(attribute, _)| *attribute)
    }

    pub fn get(&self, key: Id) -> Option<&W> {
        self.members.values().find_map(|member| member.get(key))
    }

    /// Every view key, attribute by attribute.
    pub fn keys(&self) -> impl Iterator<Item = Id> + '_ {
        self.members.values().flat_map(|member| member.views().keys())
    }

    pub fn len(&self) -> usize {
        self.members.values().map(SubviewCollection::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn render(&mut self) {
        for member in self.members.values_mut() {
            member.render();
        }
    }

    /// Mirrors each schema attribute against the matching member of
    /// `parent`. Members of `parent` the schema does not name are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if a view cannot be added or removed.
    pub fn sync(&mut self, parent: &LookupGroup<Id, R>) -> Result<SyncReport, SwitchboardError> {
        let mut report = SyncReport::default();
        for (attribute, member) in &mut self.members {
            report.merge(member.sync(parent.member(*attribute))?);
        }
        Ok(report)
    }

    pub fn clear(&mut self, options: &RemoveOptions) {
        for member in self.members.values_mut() {
            member.clear(options);
        }
    }
}
