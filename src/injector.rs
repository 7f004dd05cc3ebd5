use crate::{
    strip_qualifier, Bundle, Class, Definition, Delegate, Function, InjectError,
    InjectResult, InjectorBuilder, Parameters, Svc, Value,
};
use std::collections::BTreeMap;
use tracing::{debug, trace};

mod registry;

use registry::{Lookup, Registry};

pub(crate) trait MapContainerEx<T> {
    fn new(value: T) -> Self;
    fn with_inner<R, F: FnOnce(&T) -> R>(&self, f: F) -> R;
    fn with_inner_mut<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R;
}

#[cfg(feature = "rc")]
mod types {
    use super::MapContainerEx;
    use std::{
        cell::RefCell,
        rc::{Rc, Weak},
    };

    pub type MapContainer<T> = Rc<RefCell<T>>;
    pub type SelfHandle = Weak<crate::Injector>;

    impl<T> MapContainerEx<T> for MapContainer<T> {
        fn new(value: T) -> Self {
            Rc::new(RefCell::new(value))
        }

        fn with_inner<R, F: FnOnce(&T) -> R>(&self, f: F) -> R {
            f(&*self.borrow())
        }

        fn with_inner_mut<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
            f(&mut *self.borrow_mut())
        }
    }
}

#[cfg(feature = "arc")]
mod types {
    use super::MapContainerEx;
    use std::sync::{Arc, Mutex, Weak};

    pub type MapContainer<T> = Arc<Mutex<T>>;
    pub type SelfHandle = Weak<crate::Injector>;

    impl<T> MapContainerEx<T> for MapContainer<T> {
        fn new(value: T) -> Self {
            Arc::new(Mutex::new(value))
        }

        fn with_inner<R, F: FnOnce(&T) -> R>(&self, f: F) -> R {
            f(&*self.lock().unwrap())
        }

        fn with_inner_mut<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
            f(&mut *self.lock().unwrap())
        }
    }
}

#[allow(clippy::wildcard_imports)]
pub(crate) use types::*;

/// A runtime dependency injection container. It maps string ids to
/// definitions, caches singleton values, indexes definitions by the types they
/// produce, forwards prefixed ids to delegate containers, and injects the
/// arguments of constructors, methods and functions.
///
/// # Injecting the injector
///
/// Cloning the injector does not clone its definitions. Both handles share
/// the same registry. Every injector registers itself under its self id
/// (`"DI"` unless configured otherwise through
/// [`InjectorBuilder::self_id`]), and under its own type, so callables can
/// request it either with the `%DI` placeholder or by a parameter of type
/// [`Injector`].
///
/// ```
/// use keyed_injector::{Definition, Injector, Svc, Value};
///
/// struct Mailer {
///     injector: Svc<Injector>,
/// }
///
/// let injector = Injector::new();
/// injector
///     .set(
///         "mailer",
///         Definition::from_fn(|injector| {
///             let injector = injector.get("DI")?.downcast().unwrap();
///             Ok(Value::object(Mailer { injector }))
///         }),
///     )
///     .unwrap();
///
/// let mailer: Svc<Mailer> = injector.get("mailer").unwrap().downcast().unwrap();
/// assert!(mailer.injector.ptr_eq(&injector));
/// ```
#[derive(Clone)]
pub struct Injector {
    registry: MapContainer<Registry>,
}

impl Injector {
    /// Creates a builder for this injector.
    #[must_use]
    pub fn builder() -> InjectorBuilder {
        InjectorBuilder::default()
    }

    /// Creates an injector with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Injector::builder().build()
    }

    pub(crate) fn with_config(
        self_id: String,
        deep_resolution: bool,
        parameters: Option<Parameters>,
    ) -> Self {
        let mut registry = Registry::new(self_id.clone(), deep_resolution);
        registry.insert(&self_id, Definition::injector());
        if let Some(parameters) = parameters {
            registry.set_parameters(parameters);
        }

        Injector {
            registry: MapContainerEx::new(registry),
        }
    }

    /// Whether both handles refer to the same container.
    #[must_use]
    pub fn ptr_eq(&self, other: &Injector) -> bool {
        Svc::ptr_eq(&self.registry, &other.registry)
    }

    /// The id the injector is registered under in itself.
    #[must_use]
    pub fn self_id(&self) -> String {
        self.registry.with_inner(|registry| registry.self_id.clone())
    }

    /// Whether unregistered types are constructed directly when requested by
    /// type.
    #[must_use]
    pub fn deep_resolution(&self) -> bool {
        self.registry.with_inner(|registry| registry.deep_resolution)
    }

    pub fn set_deep_resolution(&self, enabled: bool) -> &Self {
        self.registry
            .with_inner_mut(|registry| registry.deep_resolution = enabled);
        self
    }

    /// Installs the parameter store. Only the first call has any effect; later
    /// calls are ignored.
    pub fn set_parameters(&self, parameters: impl Into<Parameters>) -> &Self {
        let installed = self.registry.with_inner_mut(|registry| {
            registry.set_parameters(parameters.into())
        });
        if !installed {
            debug!("parameters are already installed, ignoring");
        }
        self
    }

    /// The parameter stored under `key`, if any.
    #[must_use]
    pub fn get_parameter(&self, key: &str) -> Option<Value> {
        self.registry.with_inner(|registry| registry.parameter(key))
    }

    /// Registers a definition under `id`. Each id can be set only once.
    ///
    /// Object values are indexed under their concrete type and the interfaces
    /// of their [`Class`] (if one is defined), and a declared type is always
    /// indexed, so that they can later be resolved by type.
    ///
    /// ```
    /// use keyed_injector::{Definition, InjectError, Injector, Value};
    ///
    /// let injector = Injector::new();
    /// injector
    ///     .set("greeting", Value::from("hello"))?
    ///     .set("answer", Definition::from_fn(|_| Ok(Value::from(42))))?;
    ///
    /// assert_eq!(Value::from(42), injector.get("answer")?);
    /// assert!(matches!(
    ///     injector.set("greeting", Value::from("again")),
    ///     Err(InjectError::DuplicateDefinition { .. })
    /// ));
    /// # Ok::<(), InjectError>(())
    /// ```
    pub fn set(
        &self,
        id: &str,
        definition: impl Into<Definition>,
    ) -> InjectResult<&Self> {
        let definition = definition.into();
        self.registry.with_inner_mut(|registry| {
            if registry.contains(id) {
                return Err(InjectError::DuplicateDefinition {
                    id: id.to_owned(),
                });
            }

            trace!(
                id,
                singleton = definition.is_singleton(),
                declared_type = ?definition.declared_type(),
                "registering definition"
            );
            registry.insert(id, definition);
            Ok(())
        })?;

        Ok(self)
    }

    /// Resolves the value registered under `id`.
    ///
    /// Ids under a delegated prefix are answered by the delegate alone.
    /// Singleton values are constructed once and cached; the cache is written
    /// only after the factory returns, so a factory that requests its own id
    /// constructs it again rather than deadlocking.
    pub fn get(&self, id: &str) -> InjectResult<Value> {
        if let Some(delegate) = self.delegate_for(id) {
            trace!(id, "forwarding to delegate");
            return delegate.get(id);
        }

        let lookup = self
            .registry
            .with_inner(|registry| registry.lookup(id))
            .ok_or_else(|| InjectError::not_found(id))?;

        match lookup {
            Lookup::Cached(value) => {
                trace!(id, "singleton cache hit");
                Ok(value)
            }
            Lookup::Value(value) => Ok(value),
            Lookup::Injector => Ok(Value::from_svc(self.self_handle())),
            Lookup::Factory { factory, singleton } => {
                trace!(id, singleton, "invoking factory");
                let value = self.inject_function(factory, &crate::Args::new())?;
                if singleton {
                    Ok(self
                        .registry
                        .with_inner_mut(|registry| registry.cache(id, value)))
                } else {
                    Ok(value)
                }
            }
        }
    }

    /// Whether `id` can be resolved: by the delegate whose prefix it matches,
    /// or else by a local definition.
    #[must_use]
    pub fn has(&self, id: &str) -> bool {
        match self.delegate_for(id) {
            Some(delegate) => delegate.has(id),
            None => self.registry.with_inner(|registry| registry.contains(id)),
        }
    }

    /// Resolves every locally defined id that starts with `prefix`. This
    /// constructs each matching value.
    ///
    /// ```
    /// use keyed_injector::{Injector, Value};
    ///
    /// let injector = Injector::new();
    /// injector
    ///     .set("route.home", Value::from("/"))?
    ///     .set("route.about", Value::from("/about"))?
    ///     .set("title", Value::from("Home"))?;
    ///
    /// let routes = injector.find("route.")?;
    /// assert_eq!(
    ///     vec!["route.about", "route.home"],
    ///     routes.keys().collect::<Vec<_>>()
    /// );
    /// # Ok::<(), keyed_injector::InjectError>(())
    /// ```
    pub fn find(&self, prefix: &str) -> InjectResult<BTreeMap<String, Value>> {
        let ids = self
            .registry
            .with_inner(|registry| registry.ids_with_prefix(prefix));
        ids.into_iter()
            .map(|id| -> InjectResult<(String, Value)> {
                let value = self.get(&id)?;
                Ok((id, value))
            })
            .collect()
    }

    /// Forwards every id starting with `prefix` to `delegate`, replacing an
    /// earlier delegate for the same prefix.
    pub fn delegate(
        &self,
        prefix: &str,
        delegate: impl Delegate,
    ) -> &Self {
        self.add_delegate(prefix, Svc::new(delegate))
    }

    pub(crate) fn add_delegate(
        &self,
        prefix: &str,
        delegate: Svc<dyn Delegate>,
    ) -> &Self {
        debug!(prefix, "registering delegate");
        self.registry
            .with_inner_mut(|registry| registry.set_delegate(prefix, delegate));
        self
    }

    /// The shared pointer the self entry resolves to. The registry only holds
    /// it weakly, so it is recreated once every earlier handle is dropped.
    fn self_handle(&self) -> Svc<Injector> {
        if let Some(handle) = self.registry.with_inner(Registry::self_handle) {
            return handle;
        }

        let handle = Svc::new(self.clone());
        self.registry.with_inner_mut(|registry| {
            registry.set_self_handle(Svc::downgrade(&handle));
        });
        handle
    }

    /// Whether `id` is defined locally, ignoring delegates.
    pub(crate) fn defines(&self, id: &str) -> bool {
        self.registry.with_inner(|registry| registry.contains(id))
    }

    fn delegate_for(&self, id: &str) -> Option<Svc<dyn Delegate>> {
        self.registry.with_inner(|registry| registry.delegate_for(id))
    }

    /// Resolves a value by type. Leading qualifiers (`::`, `\`) are ignored.
    ///
    /// Succeeds when exactly one definition is indexed under the type. With
    /// deep resolution enabled, a type with no unique definition is instead
    /// constructed directly through its [`Class`], and a failure inside that
    /// construction names the type that could not be resolved.
    pub fn resolve_type(&self, type_name: &str) -> InjectResult<Value> {
        let type_name = strip_qualifier(type_name);
        let (unique, candidates, deep) = self.registry.with_inner(|registry| {
            (
                registry.types().unique(type_name).map(str::to_owned),
                registry.types().candidates(type_name),
                registry.deep_resolution,
            )
        });

        if let Some(id) = unique {
            trace!(type_name, id = id.as_str(), "resolved type by index");
            return self.get(&id);
        }

        if deep {
            debug!(type_name, candidates, "constructing type directly");
            return self.inject_constructor(type_name, &crate::Args::new());
        }

        debug!(type_name, candidates, "type could not be resolved");
        Err(InjectError::unresolved(type_name))
    }

    /// Describes a class to the injector, replacing an earlier description
    /// with the same name.
    pub fn define_class(&self, class: impl Into<Class>) -> &Self {
        let class = class.into();
        trace!(class = class.name(), "defining class");
        self.registry
            .with_inner_mut(|registry| registry.define_class(class));
        self
    }

    pub(crate) fn class(&self, name: &str) -> Option<Svc<Class>> {
        self.registry.with_inner(|registry| registry.class(name))
    }

    pub(crate) fn class_of(
        &self,
        type_id: std::any::TypeId,
    ) -> Option<Svc<Class>> {
        self.registry.with_inner(|registry| registry.class_of(type_id))
    }

    /// Defines a named function that can then be invoked by name through
    /// [`Injector::inject_function`]. The function must have a name.
    pub fn define_function(&self, function: Function) -> InjectResult<&Self> {
        let name = function
            .name()
            .ok_or_else(|| {
                InjectError::invalid("only named functions can be defined")
            })?
            .to_owned();
        self.registry
            .with_inner_mut(|registry| registry.define_function(&name, function));
        Ok(self)
    }

    pub(crate) fn function(&self, name: &str) -> Option<Function> {
        self.registry.with_inner(|registry| registry.function(name))
    }

    /// Lets a bundle register its definitions, propagating any error it
    /// raises.
    pub fn register<B: Bundle + ?Sized>(&self, bundle: &B) -> InjectResult<&Self> {
        bundle.register(self)?;
        Ok(self)
    }
}

impl Default for Injector {
    fn default() -> Self {
        Injector::new()
    }
}

impl Delegate for Injector {
    fn has(&self, id: &str) -> bool {
        Injector::has(self, id)
    }

    fn get(&self, id: &str) -> InjectResult<Value> {
        Injector::get(self, id)
    }
}
