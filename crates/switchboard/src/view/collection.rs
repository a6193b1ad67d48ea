//! Keyed widgets kept in step with a record set.
//!
//! A [`ViewCollection`] is usually *bound* to the event stream of the
//! records it mirrors. [`ViewCollection::sync`] then drains that stream:
//! added records get a widget, removed records lose theirs, and re-sorted
//! records re-order the widgets, so views stay index-synchronized with their
//! records.
//!
//! Records that are not independently observable, such as the endpoints
//! nested in a state, are mirrored with [`ViewCollection::reconcile`]
//! instead, which diffs the collection against the records directly.

use std::{collections::HashSet, fmt, rc::Rc};

use indexmap::IndexMap;
use log::{debug, trace};

use switchboard_core::{
    error::CollectionError,
    events::EventStream,
    group::{GroupEvent, LookupGroup},
    identifier::Id,
    lookup::{Lookup, LookupEvent},
};

use super::{RemoveOptions, Tagged, ViewSpec, Widget, WidgetRegistry};
use crate::error::SwitchboardError;

type Result<T> = std::result::Result<T, SwitchboardError>;

/// The record events a [`ViewCollection`] follows.
#[derive(Debug)]
pub enum RecordFeed {
    Lookup(EventStream<LookupEvent<Id>>),
    Group(EventStream<GroupEvent<Id>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordChange {
    Added(Id),
    Removed(Id),
    Sorted,
}

impl RecordFeed {
    fn changes(&self) -> Vec<RecordChange> {
        match self {
            Self::Lookup(stream) => stream
                .drain()
                .into_iter()
                .map(|event| match event {
                    LookupEvent::Added(key) => RecordChange::Added(key),
                    LookupEvent::Removed(key) => RecordChange::Removed(key),
                    LookupEvent::Sorted => RecordChange::Sorted,
                })
                .collect(),
            Self::Group(stream) => stream
                .drain()
                .into_iter()
                .filter_map(|event| match event {
                    GroupEvent::Added { key, .. } => Some(RecordChange::Added(key)),
                    GroupEvent::Removed { key, .. } => Some(RecordChange::Removed(key)),
                    GroupEvent::Sorted { .. } => Some(RecordChange::Sorted),
                    GroupEvent::Subscribed { .. } | GroupEvent::Unsubscribed { .. } => None,
                })
                .collect(),
        }
    }
}

/// A keyed set of records a [`ViewCollection`] can mirror.
pub trait RecordSet<R> {
    fn record(&self, key: Id) -> Option<&R>;

    /// Record keys in record order.
    fn record_keys(&self) -> Vec<Id>;
}

impl<R> RecordSet<R> for Lookup<Id, R> {
    fn record(&self, key: Id) -> Option<&R> {
        self.get(&key)
    }

    fn record_keys(&self) -> Vec<Id> {
        self.keys().copied().collect()
    }
}

impl<R> RecordSet<R> for LookupGroup<Id, R> {
    fn record(&self, key: Id) -> Option<&R> {
        self.get(&key)
    }

    fn record_keys(&self) -> Vec<Id> {
        self.keys().copied().collect()
    }
}

/// Options for adding a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    render: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self { render: true }
    }
}

impl ViewOptions {
    /// Add the view without rendering it.
    pub fn deferred() -> Self {
        Self { render: false }
    }
}

/// What a [`ViewCollection::sync`] or [`ViewCollection::reconcile`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Keys of views created.
    pub added: Vec<Id>,
    /// Keys of views destroyed.
    pub removed: Vec<Id>,
    pub reordered: bool,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && !self.reordered
    }

    pub(crate) fn merge(&mut self, other: SyncReport) {
        self.added.extend(other.added);
        self.removed.extend(other.removed);
        self.reordered |= other.reordered;
    }
}

/// Widgets keyed by view key, each optionally backed by a record.
pub struct ViewCollection<R, W> {
    views: Lookup<Id, W>,
    record_views: IndexMap<Id, Id>,
    registry: Rc<WidgetRegistry<R, W>>,
    widget_type: Option<Id>,
    feed: Option<RecordFeed>,
}

impl<R, W> fmt::Debug for ViewCollection<R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewCollection")
            .field("views", &self.views.keys().collect::<Vec<_>>())
            .field("widget_type", &self.widget_type)
            .field("bound", &self.feed.is_some())
            .finish()
    }
}

impl<R, W> ViewCollection<R, W>
where
    R: Tagged,
    W: Widget,
{
    pub fn new(registry: Rc<WidgetRegistry<R, W>>) -> Self {
        Self {
            views: Lookup::new(),
            record_views: IndexMap::new(),
            registry,
            widget_type: None,
            feed: None,
        }
    }

    /// Builds every record-backed view as `widget_type`, regardless of the
    /// record's own tag.
    pub fn with_widget_type(mut self, widget_type: Id) -> Self {
        self.widget_type = Some(widget_type);
        self
    }

    /// Follows `feed` from now on; see [`sync`](Self::sync).
    pub fn bind(&mut self, feed: RecordFeed) {
        self.feed = Some(feed);
    }

    pub fn is_bound(&self) -> bool {
        self.feed.is_some()
    }

    pub fn views(&self) -> &Lookup<Id, W> {
        &self.views
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = Id> + '_ {
        self.views.keys().copied()
    }

    pub fn get(&self, key: Id) -> Option<&W> {
        self.views.get(&key)
    }

    pub fn get_mut(&mut self, key: Id) -> Option<&mut W> {
        self.views.get_mut(&key)
    }

    /// The view backed by the record `record_key`.
    pub fn by_record(&self, record_key: Id) -> Option<&W> {
        let key = self.record_views.get(&record_key)?;
        self.views.get(key)
    }

    pub fn by_record_mut(&mut self, record_key: Id) -> Option<&mut W> {
        let key = *self.record_views.get(&record_key)?;
        self.views.get_mut(&key)
    }

    /// Builds and adds the view described by `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::DuplicateKey`] if the view key, or the
    /// record key, already has a view.
    pub fn add(&mut self, spec: ViewSpec<'_, R>, options: ViewOptions) -> Result<()> {
        if self.views.has(&spec.key) {
            return Err(CollectionError::duplicate_key(spec.key).into());
        }
        if let Some(record_key) = spec.record_key.filter(|key| self.record_views.contains_key(key)) {
            return Err(CollectionError::duplicate_key(record_key).into());
        }

        let spec = match (self.widget_type, spec.type_tag) {
            (Some(widget_type), None) => spec.with_type(widget_type),
            _ => spec,
        };
        let mut widget = self.registry.build(&spec);
        if options.render {
            widget.render();
        }
        self.views.add(spec.key, widget)?;
        if let Some(record_key) = spec.record_key {
            self.record_views.insert(record_key, spec.key);
        }
        trace!(view:? = spec.key; "Added view");
        Ok(())
    }

    /// Adds `record` to `records` and a view for it.
    ///
    /// # Errors
    ///
    /// Returns an error if either the record key or the view key is taken.
    pub fn add_with_record(
        &mut self,
        records: &mut Lookup<Id, R>,
        key: Id,
        record: R,
        options: ViewOptions,
    ) -> Result<()> {
        if self.views.has(&key) {
            return Err(CollectionError::duplicate_key(key).into());
        }
        records.add(key, record)?;
        let record = records
            .get(&key)
            .ok_or_else(|| CollectionError::missing_key(key))?;
        self.add(ViewSpec::for_record(key, record), options)
    }

    /// Removes the view `key`, handing it `options` on the way out.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::MissingKey`] if there is no such view.
    pub fn remove(&mut self, key: Id, options: &RemoveOptions) -> Result<W> {
        let mut widget = self.views.remove(&key)?;
        widget.destroy(options);
        self.record_views.retain(|_, view| *view != key);
        trace!(view:? = key; "Removed view");
        Ok(widget)
    }

    /// Removes the view `key` and, if `options.remove_record` is set, its
    /// backing record from `records`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::MissingKey`] if there is no such view.
    pub fn remove_with_record(
        &mut self,
        records: &mut Lookup<Id, R>,
        key: Id,
        options: &RemoveOptions,
    ) -> Result<(W, Option<R>)> {
        let record_key = self
            .record_views
            .iter()
            .find(|(_, view)| **view == key)
            .map(|(record, _)| *record);
        let widget = self.remove(key, options)?;
        let record = match record_key {
            Some(record_key) if options.remove_record => Some(records.remove(&record_key)?),
            _ => None,
        };
        Ok((widget, record))
    }

    /// Removes every view.
    pub fn clear(&mut self, options: &RemoveOptions) {
        let keys: Vec<Id> = self.keys().collect();
        for key in keys {
            if let Ok(mut widget) = self.views.remove(&key) {
                widget.destroy(options);
            }
        }
        self.record_views.clear();
    }

    /// Renders every view, in order.
    pub fn render(&mut self) {
        for widget in self.views.values_mut() {
            widget.render();
        }
    }

    /// Applies the pending events of the bound feed.
    ///
    /// Does nothing when the collection is unbound.
    ///
    /// # Errors
    ///
    /// Returns an error if a view cannot be added or removed.
    pub fn sync<S: RecordSet<R>>(&mut self, records: &S) -> Result<SyncReport> {
        let changes = match &self.feed {
            Some(feed) => feed.changes(),
            None => return Ok(SyncReport::default()),
        };

        let mut report = SyncReport::default();
        for change in changes {
            match change {
                RecordChange::Added(record_key) => {
                    if self.record_views.contains_key(&record_key) {
                        continue;
                    }
                    if let Some(record) = records.record(record_key) {
                        self.add(ViewSpec::for_record(record_key, record), ViewOptions::default())?;
                        report.added.push(record_key);
                    }
                }
                RecordChange::Removed(record_key) => {
                    if let Some(key) = self.record_views.get(&record_key).copied() {
                        self.remove(key, &RemoveOptions::default())?;
                        report.removed.push(key);
                    }
                }
                RecordChange::Sorted => {
                    report.reordered |= self.follow_order(&records.record_keys())?;
                }
            }
        }

        if !report.is_empty() {
            debug!(
                added = report.added.len(),
                removed = report.removed.len(),
                reordered = report.reordered;
                "Synced views"
            );
        }
        Ok(report)
    }

    /// Brings the record-backed views in line with `records` by comparing
    /// keys: missing views are built, stale ones destroyed, and the order
    /// follows the records.
    ///
    /// # Errors
    ///
    /// Returns an error if a view cannot be added or removed.
    pub fn reconcile<S: RecordSet<R>>(&mut self, records: &S) -> Result<SyncReport> {
        let keys = records.record_keys();
        let wanted: HashSet<Id> = keys.iter().copied().collect();
        let mut report = SyncReport::default();

        let stale: Vec<(Id, Id)> = self
            .record_views
            .iter()
            .filter(|(record, _)| !wanted.contains(*record))
            .map(|(record, view)| (*record, *view))
            .collect();
        for (_, view) in stale {
            self.remove(view, &RemoveOptions::default())?;
            report.removed.push(view);
        }

        for key in &keys {
            if self.record_views.contains_key(key) {
                continue;
            }
            if let Some(record) = records.record(*key) {
                self.add(ViewSpec::for_record(*key, record), ViewOptions::default())?;
                report.added.push(*key);
            }
        }

        report.reordered = self.follow_order(&keys)?;
        Ok(report)
    }

    /// Moves record-backed views into record order. Returns whether
    /// anything moved.
    fn follow_order(&mut self, record_keys: &[Id]) -> Result<bool> {
        let order: Vec<Id> = record_keys
            .iter()
            .filter_map(|record| self.record_views.get(record).copied())
            .collect();
        let current: Vec<Id> = self
            .views
            .keys()
            .copied()
            .filter(|key| order.contains(key))
            .collect();
        if current == order {
            return Ok(false);
        }
        self.views.rearrange(&order)?;
        Ok(true)
    }
}
