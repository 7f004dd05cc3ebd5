use crate::{Args, Function, InjectResult, Injector, Service, Value};

#[derive(Clone, Debug)]
pub(crate) enum DefinitionKind {
    /// Returned as-is on every request.
    Value(Value),
    /// Invoked through [`Injector::inject_function`] to produce the value.
    Factory(Function),
    /// The injector the definition is registered on.
    Injector,
}

/// A recipe registered under an id: a plain value, a factory, or a class to be
/// built by constructor injection.
///
/// Definitions are singletons unless made [`transient`](Definition::transient):
/// the first resolved value is cached and reused for every later request.
///
/// ```
/// use keyed_injector::{Definition, Injector, Value};
/// use std::sync::atomic::{AtomicI64, Ordering};
///
/// let injector = Injector::new();
/// let counter = std::sync::Arc::new(AtomicI64::new(0));
/// let next = counter.clone();
/// injector
///     .set(
///         "ticket",
///         Definition::from_fn(move |_| {
///             Ok(Value::from(next.fetch_add(1, Ordering::SeqCst)))
///         })
///         .transient(),
///     )
///     .unwrap();
///
/// assert_eq!(Value::from(0i64), injector.get("ticket").unwrap());
/// assert_eq!(Value::from(1i64), injector.get("ticket").unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct Definition {
    pub(crate) kind: DefinitionKind,
    pub(crate) singleton: bool,
    pub(crate) declared_type: Option<String>,
}

impl Definition {
    fn new(kind: DefinitionKind) -> Self {
        Definition {
            kind,
            singleton: true,
            declared_type: None,
        }
    }

    /// A definition that always resolves to `value`.
    #[must_use]
    pub fn value(value: impl Into<Value>) -> Self {
        Definition::new(DefinitionKind::Value(value.into()))
    }

    /// A definition whose value is produced by invoking `factory` with its
    /// parameters injected.
    #[must_use]
    pub fn factory(factory: Function) -> Self {
        Definition::new(DefinitionKind::Factory(factory))
    }

    /// A factory that only needs the injector.
    #[must_use]
    pub fn from_fn<F>(factory: F) -> Self
    where
        F: Fn(&Injector) -> InjectResult<Value> + Service,
    {
        Definition::factory(Function::new(move |injector, _| factory(injector)))
    }

    /// A definition built by constructor injection of the class `type_name`,
    /// using `args` for the constructor's parameters.
    #[must_use]
    pub fn class(type_name: impl Into<String>, args: Args) -> Self {
        let type_name = type_name.into();
        Definition::factory(Function::new(move |injector, _| {
            injector.inject_constructor(&type_name, &args)
        }))
    }

    pub(crate) fn injector() -> Self {
        Definition::new(DefinitionKind::Injector)
    }

    /// Resolves a fresh value on every request instead of caching the first.
    #[must_use]
    pub fn transient(mut self) -> Self {
        self.singleton = false;
        self
    }

    /// Declares a type this definition can be requested as. The type is added
    /// to the type index whatever the shape of the definition.
    #[must_use]
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.declared_type = Some(type_name.into());
        self
    }

    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.singleton
    }

    #[must_use]
    pub fn declared_type(&self) -> Option<&str> {
        self.declared_type.as_deref()
    }
}

impl From<Value> for Definition {
    fn from(value: Value) -> Self {
        Definition::value(value)
    }
}

impl From<Function> for Definition {
    fn from(factory: Function) -> Self {
        Definition::factory(factory)
    }
}
