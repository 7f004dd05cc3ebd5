use crate::{
    CallArgs, InjectError, InjectResult, Injector, Service, ServiceInfo, Svc,
    Value,
};
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt::{Debug, Formatter},
    marker::PhantomData,
};

#[cfg(feature = "arc")]
mod types {
    use crate::{CallArgs, InjectResult, Injector, Value};

    pub(crate) type FunctionBody = dyn Fn(&Injector, &CallArgs) -> InjectResult<Value>
        + Send
        + Sync;
    pub(crate) type MethodBody = dyn Fn(&Injector, &Value, &CallArgs) -> InjectResult<Value>
        + Send
        + Sync;
    pub(crate) type NullaryBody = dyn Fn() -> InjectResult<Value> + Send + Sync;
}

#[cfg(feature = "rc")]
mod types {
    use crate::{CallArgs, InjectResult, Injector, Value};

    pub(crate) type FunctionBody =
        dyn Fn(&Injector, &CallArgs) -> InjectResult<Value>;
    pub(crate) type MethodBody =
        dyn Fn(&Injector, &Value, &CallArgs) -> InjectResult<Value>;
    pub(crate) type NullaryBody = dyn Fn() -> InjectResult<Value>;
}

use types::{FunctionBody, MethodBody, NullaryBody};

/// Strips the leading qualifier punctuation (`::` or `\`) from a type
/// reference.
pub(crate) fn strip_qualifier(raw: &str) -> &str {
    raw.trim_start_matches(|c| c == ':' || c == '\\')
}

/// Returns the stripped type name if `raw` is a well-formed type reference.
pub(crate) fn type_reference(raw: &str) -> Option<&str> {
    let name = strip_qualifier(raw);
    let well_formed = !name.is_empty()
        && name.trim() == name
        && !name.chars().any(char::is_control);
    well_formed.then_some(name)
}

/// Describes one declared parameter of a callable: its name and, for
/// class-like parameters, the type it expects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    declared_type: Option<String>,
}

impl Parameter {
    /// An untyped parameter. It is only ever filled from a supplied argument.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Parameter {
            name: name.into(),
            declared_type: None,
        }
    }

    /// Declares the class-like type of this parameter by name. When no
    /// argument is supplied for it, the parameter is resolved by this type.
    #[must_use]
    pub fn typed(mut self, type_name: impl Into<String>) -> Self {
        self.declared_type = Some(type_name.into());
        self
    }

    /// Declares the type of this parameter as `T`.
    #[must_use]
    pub fn of<T: ?Sized + Any>(self) -> Self {
        self.typed(ServiceInfo::of::<T>().name())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type, stripped of leading qualifiers. A declared type that
    /// isn't a usable type reference fails with
    /// [`InjectError::DependencyResolution`] naming it.
    pub fn declared_type(&self) -> InjectResult<Option<&str>> {
        match &self.declared_type {
            None => Ok(None),
            Some(raw) => type_reference(raw)
                .map(Some)
                .ok_or_else(|| InjectError::unresolved(raw)),
        }
    }
}

/// A callable whose parameters are described explicitly. Factories, free
/// functions, static methods and declared constructors are all functions.
///
/// The body receives the injector that invoked it and the resolved arguments,
/// keyed by parameter name. Parameters that had neither a supplied argument
/// nor a declared type are absent from the arguments.
///
/// ```
/// use keyed_injector::{Args, Function, Injector, Parameter, Value};
///
/// let greet = Function::new(|_, args| {
///     let name = args.get("name").and_then(Value::as_str).unwrap_or("world");
///     Ok(Value::from(format!("hello, {}", name)))
/// })
/// .with_parameters([Parameter::new("name")]);
///
/// let injector = Injector::new();
/// let greeting = injector.inject_function(greet.clone(), &Args::new()).unwrap();
/// assert_eq!(Value::from("hello, world"), greeting);
///
/// let args = Args::new().with("name", "rust");
/// let greeting = injector.inject_function(greet, &args).unwrap();
/// assert_eq!(Value::from("hello, rust"), greeting);
/// ```
#[derive(Clone)]
pub struct Function {
    name: Option<String>,
    parameters: Vec<Parameter>,
    body: Svc<FunctionBody>,
}

impl Function {
    /// Creates an anonymous function with no declared parameters.
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Injector, &CallArgs) -> InjectResult<Value> + Service,
    {
        Function {
            name: None,
            parameters: Vec::new(),
            body: Svc::new(body),
        }
    }

    /// Names this function so it can be defined on an injector and invoked by
    /// name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declares the parameters of this function, in order.
    #[must_use]
    pub fn with_parameters(
        mut self,
        parameters: impl IntoIterator<Item = Parameter>,
    ) -> Self {
        self.parameters = parameters.into_iter().collect();
        self
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub(crate) fn call(
        &self,
        injector: &Injector,
        args: &CallArgs,
    ) -> InjectResult<Value> {
        (self.body)(injector, args)
    }
}

impl Debug for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// An instance method. The body receives the receiver the method was invoked
/// on.
#[derive(Clone)]
pub struct Method {
    parameters: Vec<Parameter>,
    body: Svc<MethodBody>,
}

impl Method {
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub(crate) fn call(
        &self,
        injector: &Injector,
        receiver: &Value,
        args: &CallArgs,
    ) -> InjectResult<Value> {
        (self.body)(injector, receiver, args)
    }
}

#[derive(Clone)]
pub(crate) enum Constructor {
    /// Constructed through a function with declared parameters.
    Declared(Function),
    /// No declared constructor. Built without arguments.
    Implicit(Svc<NullaryBody>),
    /// Interfaces and other types that cannot be instantiated.
    Abstract,
}

/// Describes a type to the injector: its name, the interfaces it implements,
/// how to construct it and which methods can be injected.
///
/// ```
/// use keyed_injector::{Args, Class, Injector, Parameter, Svc, Value};
///
/// struct Config {
///     url: String,
/// }
///
/// struct Database {
///     config: Svc<Config>,
/// }
///
/// let injector = Injector::new();
/// injector.define_class(
///     Class::of::<Database>()
///         .implements("app::Storage")
///         .constructor([Parameter::new("config").of::<Config>()], |_, args| {
///             Ok(Database { config: args.object("config")? })
///         }),
/// );
/// injector
///     .set("config", Value::object(Config { url: "sqlite::memory:".into() }))
///     .unwrap();
///
/// let db = injector.construct::<Database>(&Args::new()).unwrap();
/// assert_eq!("sqlite::memory:", db.config.url);
/// ```
#[derive(Clone)]
pub struct Class {
    name: String,
    type_id: Option<TypeId>,
    interfaces: Vec<String>,
    constructor: Constructor,
    methods: HashMap<String, Method>,
    static_methods: HashMap<String, Function>,
}

impl Class {
    /// Starts describing `T`, named after [`std::any::type_name`].
    #[must_use]
    pub fn of<T: Service>() -> ClassBuilder<T> {
        Class::named(ServiceInfo::of::<T>().name())
    }

    /// Starts describing `T` under a custom name.
    #[must_use]
    pub fn named<T: Service>(name: impl Into<String>) -> ClassBuilder<T> {
        ClassBuilder {
            class: Class {
                name: strip_qualifier(&name.into()).to_owned(),
                type_id: Some(TypeId::of::<T>()),
                interfaces: Vec::new(),
                constructor: Constructor::Abstract,
                methods: HashMap::new(),
                static_methods: HashMap::new(),
            },
            marker: PhantomData,
        }
    }

    /// Describes an interface: a type that can be requested and can carry
    /// static methods, but is never instantiated itself.
    #[must_use]
    pub fn interface(name: impl Into<String>) -> Self {
        Class {
            name: strip_qualifier(&name.into()).to_owned(),
            type_id: None,
            interfaces: Vec::new(),
            constructor: Constructor::Abstract,
            methods: HashMap::new(),
            static_methods: HashMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// Whether the class has a declared constructor.
    #[must_use]
    pub fn declares_constructor(&self) -> bool {
        matches!(self.constructor, Constructor::Declared(_))
    }

    #[must_use]
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    #[must_use]
    pub fn static_method(&self, name: &str) -> Option<&Function> {
        self.static_methods.get(name)
    }

    pub(crate) fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    pub(crate) fn constructor(&self) -> &Constructor {
        &self.constructor
    }
}

impl Debug for Class {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("interfaces", &self.interfaces)
            .finish_non_exhaustive()
    }
}

/// Builds a [`Class`] describing the concrete type `T`.
pub struct ClassBuilder<T: Service> {
    class: Class,
    marker: PhantomData<fn() -> T>,
}

impl<T: Service> ClassBuilder<T> {
    /// Records an interface or supertype `T` can be requested as.
    #[must_use]
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        let interface = strip_qualifier(&interface.into()).to_owned();
        self.class.interfaces.push(interface);
        self
    }

    /// Declares the constructor of `T` and its parameters.
    #[must_use]
    pub fn constructor<F>(
        mut self,
        parameters: impl IntoIterator<Item = Parameter>,
        constructor: F,
    ) -> Self
    where
        F: Fn(&Injector, &CallArgs) -> InjectResult<T> + Service,
    {
        let function = Function::new(move |injector, args| {
            constructor(injector, args).map(Value::object)
        })
        .named(self.class.name.clone())
        .with_parameters(parameters);
        self.class.constructor = Constructor::Declared(function);
        self
    }

    /// `T` declares no constructor and is built with `factory`. Supplied
    /// arguments are ignored when it is constructed.
    #[must_use]
    pub fn instantiate_with<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> T + Service,
    {
        let body: Svc<NullaryBody> =
            Svc::new(move || -> InjectResult<Value> {
                Ok(Value::object(factory()))
            });
        self.class.constructor = Constructor::Implicit(body);
        self
    }

    /// `T` declares no constructor and is built with [`Default`].
    #[must_use]
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.instantiate_with(T::default)
    }

    /// Declares an instance method. Invoking it on a receiver that is not a
    /// `T` fails with [`InjectError::InvalidArgument`].
    #[must_use]
    pub fn method<F>(
        mut self,
        name: impl Into<String>,
        parameters: impl IntoIterator<Item = Parameter>,
        method: F,
    ) -> Self
    where
        F: Fn(&T, &Injector, &CallArgs) -> InjectResult<Value> + Service,
    {
        let name = name.into();
        let class_name = self.class.name.clone();
        let body: Svc<MethodBody> = Svc::new(
            move |injector: &Injector, receiver: &Value, args: &CallArgs| {
                let this = receiver.downcast::<T>().ok_or_else(|| {
                    InjectError::invalid(format!(
                        "receiver is not an instance of {}",
                        class_name
                    ))
                })?;
                method(&this, injector, args)
            },
        );
        self.class.methods.insert(
            name,
            Method {
                parameters: parameters.into_iter().collect(),
                body,
            },
        );
        self
    }

    /// Declares a static method.
    #[must_use]
    pub fn static_method<F>(
        mut self,
        name: impl Into<String>,
        parameters: impl IntoIterator<Item = Parameter>,
        method: F,
    ) -> Self
    where
        F: Fn(&Injector, &CallArgs) -> InjectResult<Value> + Service,
    {
        let name = name.into();
        let function = Function::new(method)
            .named(name.clone())
            .with_parameters(parameters);
        self.class.static_methods.insert(name, function);
        self
    }

    #[must_use]
    pub fn build(self) -> Class {
        self.class
    }
}

impl<T: Service> From<ClassBuilder<T>> for Class {
    fn from(builder: ClassBuilder<T>) -> Self {
        builder.build()
    }
}
