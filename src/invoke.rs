use crate::{
    strip_qualifier, Args, Class, Constructor, Function, InjectError,
    InjectResult, Injector, Service, ServiceInfo, Svc, Value,
};
use tracing::trace;

/// Something [`Injector::inject_function`] can be asked to call.
#[derive(Clone, Debug)]
pub enum Callable {
    /// A function defined on the injector through
    /// [`Injector::define_function`].
    Named(String),
    /// An anonymous function.
    Closure(Function),
    /// Any other value. Invoking it fails.
    Other(Value),
}

impl From<&str> for Callable {
    fn from(name: &str) -> Self {
        Callable::Named(name.to_owned())
    }
}

impl From<String> for Callable {
    fn from(name: String) -> Self {
        Callable::Named(name)
    }
}

impl From<Function> for Callable {
    fn from(function: Function) -> Self {
        Callable::Closure(function)
    }
}

impl From<Value> for Callable {
    fn from(value: Value) -> Self {
        if let Value::Str(name) = value {
            return Callable::Named(name);
        }

        match value.downcast::<Function>() {
            Some(function) => Callable::Closure(Function::clone(&function)),
            None => Callable::Other(value),
        }
    }
}

impl Injector {
    /// Constructs the class named `type_name`.
    ///
    /// A class with a declared constructor has its parameters resolved from
    /// `args`, then by type. A class without one is built with no arguments,
    /// and `args` is ignored.
    pub fn inject_constructor(
        &self,
        type_name: &str,
        args: &Args,
    ) -> InjectResult<Value> {
        let type_name = strip_qualifier(type_name);
        let class = self.known_class(type_name)?;

        match class.constructor() {
            Constructor::Declared(constructor) => {
                trace!(class = type_name, "injecting constructor");
                let args = self.resolve_arguments(constructor.parameters(), args)?;
                constructor.call(self, &args)
            }
            Constructor::Implicit(instantiate) => {
                trace!(class = type_name, "instantiating without arguments");
                instantiate()
            }
            Constructor::Abstract => Err(InjectError::unresolved(type_name)),
        }
    }

    /// Constructs a `T` through its [`Class`].
    ///
    /// ```
    /// use keyed_injector::{Args, Class, Injector, Svc};
    ///
    /// #[derive(Default)]
    /// struct Clock;
    ///
    /// let injector = Injector::new();
    /// injector.define_class(Class::of::<Clock>().default_constructor());
    ///
    /// let first = injector.construct::<Clock>(&Args::new()).unwrap();
    /// let second = injector.construct::<Clock>(&Args::new()).unwrap();
    /// assert!(!Svc::ptr_eq(&first, &second));
    /// ```
    pub fn construct<T: Service>(&self, args: &Args) -> InjectResult<Svc<T>> {
        let info = ServiceInfo::of::<T>();
        let type_name = self
            .class_of(info.id())
            .map_or_else(|| info.name().to_owned(), |class| class.name().to_owned());

        self.inject_constructor(&type_name, args)?
            .downcast()
            .ok_or_else(|| {
                InjectError::invalid(format!(
                    "the constructor of {} did not produce a {}",
                    type_name,
                    info.name()
                ))
            })
    }

    /// Calls the static method `method` of the class named `type_name`.
    pub fn inject_static_method(
        &self,
        type_name: &str,
        method: &str,
        args: &Args,
    ) -> InjectResult<Value> {
        let type_name = strip_qualifier(type_name);
        let class = self.known_class(type_name)?;
        let function = class.static_method(method).ok_or_else(|| {
            InjectError::invalid(format!(
                "{} has no static method \"{}\"",
                type_name, method
            ))
        })?;

        trace!(class = type_name, method, "injecting static method");
        let args = self.resolve_arguments(function.parameters(), args)?;
        function.call(self, &args)
    }

    /// Calls the method `method` on `instance`. The instance must be an
    /// object whose type has a [`Class`] declaring the method.
    ///
    /// ```
    /// use keyed_injector::{Args, Class, Injector, Parameter, Value};
    ///
    /// struct Counter {
    ///     start: i64,
    /// }
    ///
    /// let injector = Injector::new();
    /// injector.define_class(Class::of::<Counter>().method(
    ///     "add",
    ///     [Parameter::new("step")],
    ///     |counter, _, args| {
    ///         let step = args.get("step").and_then(Value::as_int).unwrap_or(1);
    ///         Ok(Value::from(counter.start + step))
    ///     },
    /// ));
    ///
    /// let counter = Value::object(Counter { start: 10 });
    /// let args = Args::new().with("step", 5);
    /// assert_eq!(Value::from(15), injector.inject_method(&counter, "add", &args).unwrap());
    /// assert_eq!(
    ///     Value::from(11),
    ///     injector.inject_method(&counter, "add", &Args::new()).unwrap()
    /// );
    /// ```
    pub fn inject_method(
        &self,
        instance: &Value,
        method: &str,
        args: &Args,
    ) -> InjectResult<Value> {
        let object = instance.as_object().ok_or_else(|| {
            InjectError::invalid(format!(
                "cannot call \"{}\" on a value that is not an object",
                method
            ))
        })?;
        let info = object.info();
        let class = self.class_of(info.id()).ok_or_else(|| {
            InjectError::invalid(format!("no class is defined for {}", info.name()))
        })?;
        let target = class.method(method).ok_or_else(|| {
            InjectError::invalid(format!(
                "{} has no method \"{}\"",
                class.name(),
                method
            ))
        })?;

        trace!(class = class.name(), method, "injecting method");
        let args = self.resolve_arguments(target.parameters(), args)?;
        target.call(self, instance, &args)
    }

    /// Calls a function, either one defined on the injector by name or an
    /// anonymous one. Anything else fails before any argument is resolved.
    pub fn inject_function(
        &self,
        function: impl Into<Callable>,
        args: &Args,
    ) -> InjectResult<Value> {
        let function = match function.into() {
            Callable::Closure(function) => function,
            Callable::Named(name) => self.function(&name).ok_or_else(|| {
                InjectError::invalid(format!("no function named \"{}\"", name))
            })?,
            Callable::Other(value) => {
                return Err(InjectError::invalid(format!(
                    "{:?} is not callable",
                    value
                )))
            }
        };

        trace!(function = ?function.name(), "injecting function");
        let args = self.resolve_arguments(function.parameters(), args)?;
        function.call(self, &args)
    }

    fn known_class(&self, type_name: &str) -> InjectResult<Svc<Class>> {
        self.class(type_name)
            .ok_or_else(|| InjectError::unresolved(type_name))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Args, Callable, Class, Function, InjectError, Injector, Parameter,
        Value,
    };

    #[derive(Default)]
    struct Widget;

    #[test]
    fn values_become_callables() {
        assert!(matches!(
            Callable::from(Value::from("build")),
            Callable::Named(name) if name == "build"
        ));
        assert!(matches!(
            Callable::from(Value::object(Function::new(|_, _| Ok(Value::Null)))),
            Callable::Closure(_)
        ));
        assert!(matches!(
            Callable::from(Value::from(3)),
            Callable::Other(Value::Int(3))
        ));
    }

    #[test]
    fn interfaces_cannot_be_constructed() {
        let injector = Injector::new();
        injector.define_class(Class::interface("app::Storage"));

        match injector.inject_constructor("::app::Storage", &Args::new()) {
            Err(InjectError::DependencyResolution { type_name })
                if type_name == "app::Storage" => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn unknown_classes_fail_resolution() {
        let injector = Injector::new();

        match injector.inject_static_method("app::Missing", "create", &Args::new()) {
            Err(InjectError::DependencyResolution { type_name })
                if type_name == "app::Missing" => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn unknown_methods_are_invalid() {
        let injector = Injector::new();
        injector.define_class(Class::of::<Widget>().default_constructor());

        let widget = injector.inject_constructor(
            std::any::type_name::<Widget>(),
            &Args::new(),
        );
        let widget = widget.unwrap();
        assert!(matches!(
            injector.inject_method(&widget, "spin", &Args::new()),
            Err(InjectError::InvalidArgument(_))
        ));
        assert!(matches!(
            injector.inject_static_method(
                std::any::type_name::<Widget>(),
                "spin",
                &Args::new()
            ),
            Err(InjectError::InvalidArgument(_))
        ));
    }

    #[test]
    fn receivers_need_a_class() {
        let injector = Injector::new();

        assert!(matches!(
            injector.inject_method(&Value::object(Widget), "spin", &Args::new()),
            Err(InjectError::InvalidArgument(_))
        ));
        assert!(matches!(
            injector.inject_method(&Value::from("widget"), "spin", &Args::new()),
            Err(InjectError::InvalidArgument(_))
        ));
    }

    #[test]
    fn implicit_constructors_ignore_arguments() {
        let injector = Injector::new();
        injector.define_class(Class::of::<Widget>().instantiate_with(|| Widget));

        let args = Args::new().with("size", 3);
        assert!(injector.construct::<Widget>(&args).is_ok());
    }

    #[test]
    fn uncallable_values_fail_before_resolution() {
        let injector = Injector::new();
        let unresolvable = Function::new(|_, _| Ok(Value::Null))
            .with_parameters([Parameter::new("missing").typed("app::Missing")]);

        assert!(matches!(
            injector.inject_function(Value::from(1), &Args::new()),
            Err(InjectError::InvalidArgument(_))
        ));
        assert!(matches!(
            injector.inject_function("undefined", &Args::new()),
            Err(InjectError::InvalidArgument(_))
        ));
        assert!(matches!(
            injector.inject_function(unresolvable, &Args::new()),
            Err(InjectError::DependencyResolution { .. })
        ));
    }
}
