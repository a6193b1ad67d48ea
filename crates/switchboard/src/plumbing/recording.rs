//! An in-memory visual layer.

use indexmap::{IndexMap, IndexSet};
use log::trace;

use switchboard_core::identifier::Id;

use super::{HandleOptions, LinkId, Plumbing, VisualLink};

/// A call made on a [`RecordingPlumbing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlumbingCall {
    CreateLink(VisualLink),
    RemoveLink(VisualLink),
    MakeSource(Id),
    MakeTarget(Id),
    Release(Id),
}

/// A [`Plumbing`] that keeps lines and handles in memory.
///
/// Used headless (snapshots, command-line tools) and in tests, where
/// [`draw`](Self::draw) stands in for a user dragging out a line. The call
/// log grows with every call, so it is off unless asked for with
/// [`with_call_log`](Self::with_call_log).
#[derive(Debug, Default)]
pub struct RecordingPlumbing {
    next_id: u64,
    links: IndexMap<LinkId, VisualLink>,
    sources: IndexMap<Id, HandleOptions>,
    targets: IndexMap<Id, HandleOptions>,
    calls: Option<Vec<PlumbingCall>>,
}

impl RecordingPlumbing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every call, in order, for [`calls`](Self::calls).
    pub fn with_call_log(mut self) -> Self {
        self.calls = Some(Vec::new());
        self
    }

    /// Draws a line the way a user gesture would; the caller reports it
    /// through `Diagram::on_link_created`.
    pub fn draw(&mut self, source: Id, target: Id) -> VisualLink {
        self.create_link(source, target)
    }

    /// Erases a line the way a user gesture would; the caller reports it
    /// through `Diagram::on_link_detached`.
    pub fn erase(&mut self, link: &VisualLink) {
        self.remove_link(link);
    }

    pub fn links(&self) -> impl Iterator<Item = &VisualLink> {
        self.links.values()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn has_link(&self, link: &VisualLink) -> bool {
        self.links.contains_key(&link.id)
    }

    /// Lines from `source` to `target`.
    pub fn links_between(&self, source: Id, target: Id) -> usize {
        self.links
            .values()
            .filter(|link| link.source == source && link.target == target)
            .count()
    }

    pub fn is_source(&self, handle: Id) -> bool {
        self.sources.contains_key(&handle)
    }

    pub fn is_target(&self, handle: Id) -> bool {
        self.targets.contains_key(&handle)
    }

    pub fn source_options(&self, handle: Id) -> Option<&HandleOptions> {
        self.sources.get(&handle)
    }

    /// Every handle currently registered, as source or target.
    pub fn handles(&self) -> IndexSet<Id> {
        self.sources.keys().chain(self.targets.keys()).copied().collect()
    }

    /// The recorded calls; empty unless the log was enabled.
    pub fn calls(&self) -> &[PlumbingCall] {
        self.calls.as_deref().unwrap_or_default()
    }

    fn note(&mut self, call: PlumbingCall) {
        if let Some(calls) = &mut self.calls {
            calls.push(call);
        }
    }
}

impl Plumbing for RecordingPlumbing {
    fn create_link(&mut self, source: Id, target: Id) -> VisualLink {
        self.next_id += 1;
        let link = VisualLink::new(self.next_id, source, target);
        trace!(link = link.id.raw(), source:? = source, target:? = target; "Drew link");
        self.links.insert(link.id, link);
        self.note(PlumbingCall::CreateLink(link));
        link
    }

    fn remove_link(&mut self, link: &VisualLink) {
        if self.links.shift_remove(&link.id).is_some() {
            trace!(link = link.id.raw(); "Erased link");
        }
        self.note(PlumbingCall::RemoveLink(*link));
    }

    fn make_source(&mut self, handle: Id, options: &HandleOptions) {
        self.sources.insert(handle, *options);
        self.note(PlumbingCall::MakeSource(handle));
    }

    fn make_target(&mut self, handle: Id, options: &HandleOptions) {
        self.targets.insert(handle, *options);
        self.note(PlumbingCall::MakeTarget(handle));
    }

    fn release(&mut self, handle: Id) {
        self.sources.shift_remove(&handle);
        self.targets.shift_remove(&handle);
        self.note(PlumbingCall::Release(handle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_are_tracked() {
        let mut plumbing = RecordingPlumbing::new().with_call_log();
        let a = plumbing.draw(Id::new("x"), Id::new("y"));
        let b = plumbing.draw(Id::new("x"), Id::new("y"));

        assert_ne!(a.id, b.id);
        assert_eq!(plumbing.links_between(Id::new("x"), Id::new("y")), 2);

        plumbing.erase(&a);
        plumbing.erase(&a);
        assert!(!plumbing.has_link(&a));
        assert_eq!(plumbing.link_count(), 1);
        assert_eq!(plumbing.calls().len(), 4);
        assert_eq!(plumbing.calls()[3], PlumbingCall::RemoveLink(a));
    }

    #[test]
    fn test_call_log_is_off_by_default() {
        let mut plumbing = RecordingPlumbing::new();
        let link = plumbing.draw(Id::new("x"), Id::new("y"));
        plumbing.erase(&link);
        plumbing.release(Id::new("x"));

        assert!(plumbing.calls().is_empty());
        assert_eq!(plumbing.link_count(), 0);
    }

    #[test]
    fn test_handles_are_registered_and_released() {
        let mut plumbing = RecordingPlumbing::new();
        let options = HandleOptions {
            max_connections: Some(1),
        };
        plumbing.make_source(Id::new("h"), &options);
        plumbing.make_target(Id::new("h"), &HandleOptions::default());

        assert!(plumbing.is_source(Id::new("h")));
        assert!(plumbing.is_target(Id::new("h")));
        assert_eq!(plumbing.source_options(Id::new("h")), Some(&options));
        assert_eq!(plumbing.handles().len(), 1);

        plumbing.release(Id::new("h"));
        assert!(plumbing.handles().is_empty());
    }
}
