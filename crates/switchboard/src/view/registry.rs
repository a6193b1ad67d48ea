use std::fmt;

use indexmap::IndexMap;

use switchboard_core::identifier::Id;

use super::Tagged;

/// Everything a widget constructor gets to see.
#[derive(Debug)]
pub struct ViewSpec<'a, R> {
    /// Key of the view in its collection.
    pub key: Id,
    /// Key of the backing record, if any.
    pub record_key: Option<Id>,
    pub record: Option<&'a R>,
    /// Explicit widget type, taking precedence over the record's own tag.
    pub type_tag: Option<Id>,
}

impl<'a, R> ViewSpec<'a, R> {
    /// A view for `record`, keyed like the record.
    pub fn for_record(key: Id, record: &'a R) -> Self {
        Self {
            key,
            record_key: Some(key),
            record: Some(record),
            type_tag: None,
        }
    }

    /// A view with no backing record.
    pub fn view_only(key: Id) -> Self {
        Self {
            key,
            record_key: None,
            record: None,
            type_tag: None,
        }
    }

    /// Keys the view differently from its record.
    pub fn with_key(mut self, key: Id) -> Self {
        self.key = key;
        self
    }

    pub fn with_type(mut self, type_tag: Id) -> Self {
        self.type_tag = Some(type_tag);
        self
    }
}

type Factory<R, W> = dyn Fn(&ViewSpec<'_, R>) -> W;

/// Maps widget types to widget constructors.
///
/// The type of a view is its spec's explicit type, or else its record's
/// [`Tagged::type_tag`]. Unknown or missing types use the fallback.
pub struct WidgetRegistry<R, W> {
    factories: IndexMap<Id, Box<Factory<R, W>>>,
    fallback: Box<Factory<R, W>>,
}

impl<R, W> fmt::Debug for WidgetRegistry<R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetRegistry")
            .field("types", &self.factories.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<R: Tagged, W> WidgetRegistry<R, W> {
    pub fn new<F>(fallback: F) -> Self
    where
        F: Fn(&ViewSpec<'_, R>) -> W + 'static,
    {
        Self {
            factories: IndexMap::new(),
            fallback: Box::new(fallback),
        }
    }

    /// Registers the constructor for `type_tag`, replacing any previous one.
    pub fn register<F>(mut self, type_tag: Id, factory: F) -> Self
    where
        F: Fn(&ViewSpec<'_, R>) -> W + 'static,
    {
        self.factories.insert(type_tag, Box::new(factory));
        self
    }

    pub fn has(&self, type_tag: Id) -> bool {
        self.factories.contains_key(&type_tag)
    }

    /// The type a view built from `spec` gets.
    pub fn resolve_type(&self, spec: &ViewSpec<'_, R>) -> Option<Id> {
        spec.type_tag
            .or_else(|| spec.record.and_then(Tagged::type_tag))
    }

    pub fn build(&self, spec: &ViewSpec<'_, R>) -> W {
        let factory = self
            .resolve_type(spec)
            .and_then(|type_tag| self.factories.get(&type_tag));
        match factory {
            Some(factory) => factory(spec),
            None => (self.fallback)(spec),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Record(Option<Id>);

    impl Tagged for Record {
        fn type_tag(&self) -> Option<Id> {
            self.0
        }
    }

    fn registry() -> WidgetRegistry<Record, String> {
        WidgetRegistry::new(|spec: &ViewSpec<'_, Record>| format!("plain:{}", spec.key))
            .register(Id::new("fancy"), |spec: &ViewSpec<'_, Record>| {
                format!("fancy:{}", spec.key)
            })
    }

    #[test]
    fn test_dispatch_by_record_tag() {
        let registry = registry();
        let fancy = Record(Some(Id::new("fancy")));
        let untagged = Record(None);
        let unknown = Record(Some(Id::new("odd")));

        assert_eq!(registry.build(&ViewSpec::for_record(Id::new("a"), &fancy)), "fancy:a");
        assert_eq!(registry.build(&ViewSpec::for_record(Id::new("b"), &untagged)), "plain:b");
        assert_eq!(registry.build(&ViewSpec::for_record(Id::new("c"), &unknown)), "plain:c");
    }

    #[test]
    fn test_explicit_type_wins() {
        let registry = registry();
        let untagged = Record(None);
        let spec = ViewSpec::for_record(Id::new("a"), &untagged).with_type(Id::new("fancy"));
        assert_eq!(registry.build(&spec), "fancy:a");

        let view_only = ViewSpec::<Record>::view_only(Id::new("v")).with_type(Id::new("fancy"));
        assert_eq!(registry.build(&view_only), "fancy:v");
        assert!(registry.has(Id::new("fancy")));
    }
}
