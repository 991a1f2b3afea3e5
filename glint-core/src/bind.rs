//! Widget Binding
//!
//! The binding layer connects reactive values to external widgets: objects
//! with settable named properties and an optional teardown. The core knows
//! nothing about any concrete widget API beyond the [`Bindable`] trait.
//!
//! [`bind`] takes a constructor and a property bag where each property is
//! either a plain value or an accessor. The widget is constructed from the
//! resolved initial values; every accessor-valued property then gets its own
//! effect assigning the live value whenever it changes. All binding effects
//! live in a dedicated root owned by the returned [`Bound`] handle, whose
//! `destroy` runs the accumulated cleanups before delegating to the widget's
//! own teardown, composing around the widget instead of patching it.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use crate::reactive::{create_effect, create_root, untrack, RootDisposer};

/// Failure to assign a widget property.
///
/// Raised by [`Bindable::set_property`]; the binding layer catches and
/// ignores these (a read-only or unknown property simply stays unbound).
#[derive(Debug, Error)]
pub enum PropertyError {
    #[error("unknown property `{0}`")]
    Unknown(String),
    #[error("property `{0}` is read-only")]
    ReadOnly(String),
    #[error("unsupported value for property `{0}`")]
    Invalid(String),
}

/// An external object with gettable/settable named properties and an
/// optional teardown.
pub trait Bindable: Send + Sync {
    /// Assign a named property.
    fn set_property(&self, name: &str, value: &Value) -> Result<(), PropertyError>;

    /// Release the widget's own resources. Called by [`Bound::destroy`]
    /// after all binding effects have been disposed.
    fn teardown(&self) {}
}

/// One entry of a property bag.
#[derive(Clone)]
pub enum Prop {
    /// A plain value, assigned once at construction.
    Value(Value),
    /// A reactive accessor; changes are assigned through a dedicated effect.
    Accessor(Arc<dyn Fn() -> Value + Send + Sync>),
}

/// An ordered property bag for [`bind`].
#[derive(Clone, Default)]
pub struct Props {
    entries: IndexMap<String, Prop>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain-valued property.
    pub fn value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(name.into(), Prop::Value(value.into()));
        self
    }

    /// Add an accessor-valued property.
    pub fn accessor(
        mut self,
        name: impl Into<String>,
        f: impl Fn() -> Value + Send + Sync + 'static,
    ) -> Self {
        self.entries
            .insert(name.into(), Prop::Accessor(Arc::new(f)));
        self
    }

    /// Resolve every property to its current value.
    ///
    /// Accessors are evaluated untracked; constructing a widget must not
    /// subscribe whatever scope happens to be running.
    fn resolve_initial(&self) -> IndexMap<String, Value> {
        self.entries
            .iter()
            .map(|(name, prop)| {
                let value = match prop {
                    Prop::Value(value) => value.clone(),
                    Prop::Accessor(accessor) => untrack(|| accessor()),
                };
                (name.clone(), value)
            })
            .collect()
    }
}

/// An owning handle for a reactively bound widget.
pub struct Bound<W: Bindable> {
    widget: Arc<W>,
    scope: RootDisposer,
}

impl<W: Bindable> Bound<W> {
    /// The bound widget.
    pub fn widget(&self) -> &W {
        &self.widget
    }

    /// Dispose every binding effect, then tear the widget down.
    pub fn destroy(self) {
        self.scope.dispose();
        self.widget.teardown();
    }
}

/// Construct a widget and wire its accessor-valued properties.
///
/// `make` receives the resolved initial values. Each accessor-valued
/// property gets an effect that re-assigns the property when the accessor's
/// dependencies change; assignment failures are logged at debug level and
/// otherwise ignored.
pub fn bind<W, F>(make: F, props: Props) -> Bound<W>
where
    W: Bindable + 'static,
    F: FnOnce(&IndexMap<String, Value>) -> W,
{
    let initial = props.resolve_initial();
    let widget = Arc::new(make(&initial));

    let effects_widget = Arc::clone(&widget);
    let scope = create_root(move |disposer| {
        for (name, prop) in props.entries {
            let Prop::Accessor(accessor) = prop else {
                continue;
            };
            let widget = Arc::clone(&effects_widget);
            create_effect(move || {
                let value = accessor();
                if let Err(error) = widget.set_property(&name, &value) {
                    tracing::debug!(property = %name, %error, "ignoring property assignment failure");
                }
            });
        }
        disposer
    });

    Bound { widget, scope }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{create_signal, flush};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct MockWidget {
        properties: Mutex<HashMap<String, Value>>,
        torn_down: AtomicBool,
    }

    impl MockWidget {
        fn new(initial: &IndexMap<String, Value>) -> Self {
            Self {
                properties: Mutex::new(initial.clone().into_iter().collect()),
                torn_down: AtomicBool::new(false),
            }
        }

        fn property(&self, name: &str) -> Option<Value> {
            self.properties.lock().get(name).cloned()
        }
    }

    impl Bindable for MockWidget {
        fn set_property(&self, name: &str, value: &Value) -> Result<(), PropertyError> {
            if name == "id" {
                return Err(PropertyError::ReadOnly(name.to_string()));
            }
            self.properties
                .lock()
                .insert(name.to_string(), value.clone());
            Ok(())
        }

        fn teardown(&self) {
            self.torn_down.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn plain_and_accessor_props_resolve_at_construction() {
        let (label, _set_label) = create_signal(String::from("ready"));

        let bound = bind(
            MockWidget::new,
            Props::new()
                .value("width", json!(120))
                .accessor("label", move || json!(label.get())),
        );

        assert_eq!(bound.widget().property("width"), Some(json!(120)));
        assert_eq!(bound.widget().property("label"), Some(json!("ready")));
        bound.destroy();
    }

    #[test]
    fn accessor_props_stay_live_until_destroy() {
        let (label, set_label) = create_signal(String::from("a"));

        let bound = bind(
            MockWidget::new,
            Props::new().accessor("label", move || json!(label.get())),
        );

        set_label.set(String::from("b"));
        flush();
        assert_eq!(bound.widget().property("label"), Some(json!("b")));

        let widget = Arc::clone(&bound.widget);
        bound.destroy();
        assert!(widget.torn_down.load(Ordering::SeqCst));

        set_label.set(String::from("c"));
        flush();
        assert_eq!(widget.property("label"), Some(json!("b")));
    }

    #[test]
    fn readonly_property_failures_are_swallowed() {
        let (id, set_id) = create_signal(1);

        let bound = bind(
            MockWidget::new,
            Props::new().accessor("id", move || json!(id.get())),
        );

        // The failing assignment neither panics nor unbinds anything else.
        set_id.set(2);
        flush();
        assert_eq!(bound.widget().property("id"), Some(json!(1)));
        bound.destroy();
    }
}
