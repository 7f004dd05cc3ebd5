use crate::{
    Definition, Delegate, InjectError, InjectResult, Injector, Parameters, Svc,
    Value,
};
use std::collections::HashSet;

/// Anything that can seed an [`Injector`] with definitions, delegates and
/// parameters. Bundles are run with [`Injector::register`], which propagates
/// any error they raise.
///
/// Closures taking the injector are bundles too:
///
/// ```
/// use keyed_injector::{InjectResult, Injector, Value};
///
/// let defaults = |injector: &Injector| -> InjectResult<()> {
///     injector.set("app.name", Value::from("demo"))?;
///     Ok(())
/// };
///
/// let injector = Injector::new();
/// injector.register(&defaults).unwrap();
/// assert_eq!(Value::from("demo"), injector.get("app.name").unwrap());
/// ```
pub trait Bundle {
    fn register(&self, injector: &Injector) -> InjectResult<()>;
}

impl<F> Bundle for F
where
    F: Fn(&Injector) -> InjectResult<()>,
{
    fn register(&self, injector: &Injector) -> InjectResult<()> {
        self(injector)
    }
}

/// A collection of definitions, delegates and parameters that can be
/// registered on an injector all at once. Modules can be used to group
/// together related services and configure the injector in pieces rather than
/// all at once.
///
/// For creating a module easily via a domain specific language, see
/// [`define_module!`].
#[derive(Clone, Default)]
pub struct Module {
    definitions: Vec<(String, Definition)>,
    delegates: Vec<(String, Svc<dyn Delegate>)>,
    parameters: Option<Parameters>,
}

impl Module {
    /// Adds a definition. Registering the module fails if the id is already
    /// defined on the injector.
    pub fn set(&mut self, id: impl Into<String>, definition: impl Into<Definition>) {
        self.definitions.push((id.into(), definition.into()));
    }

    /// Adds a parameter. The module's parameters are only installed if the
    /// injector has none yet.
    pub fn parameter(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.parameters
            .get_or_insert_with(Parameters::default)
            .insert(key.into(), value.into());
    }

    /// Forwards ids starting with `prefix` to `delegate`.
    pub fn delegate(&mut self, prefix: impl Into<String>, delegate: impl Delegate) {
        self.delegates.push((prefix.into(), Svc::new(delegate)));
    }
}

impl Bundle for Module {
    /// Registers everything or nothing: every id is checked before the
    /// injector is changed.
    fn register(&self, injector: &Injector) -> InjectResult<()> {
        let mut ids = HashSet::new();
        for (id, _) in &self.definitions {
            if injector.defines(id) || !ids.insert(id.as_str()) {
                return Err(InjectError::DuplicateDefinition { id: id.clone() });
            }
        }

        for (id, definition) in &self.definitions {
            injector.set(id, definition.clone())?;
        }

        if let Some(parameters) = &self.parameters {
            injector.set_parameters(parameters.clone());
        }

        for (prefix, delegate) in &self.delegates {
            injector.add_delegate(prefix, delegate.clone());
        }

        Ok(())
    }
}

/// Defines a new module using a domain specific language.
///
/// # Example
///
/// ```
/// use keyed_injector::{define_module, Definition, Injector, Value};
///
/// struct Env;
///
/// impl keyed_injector::Delegate for Env {
///     fn has(&self, id: &str) -> bool {
///         id == "env.home"
///     }
///
///     fn get(&self, _id: &str) -> keyed_injector::InjectResult<Value> {
///         Ok(Value::from("/home/demo"))
///     }
/// }
///
/// let module = define_module! {
///     definitions = {
///         "app.name" => Value::from("demo"),
///         "app.title" => Definition::from_fn(|injector| {
///             let name = injector.get("app.name")?;
///             Ok(Value::from(format!("{} app", name.as_str().unwrap_or_default())))
///         }),
///     },
///     parameters = {
///         "env" => "prod",
///     },
///     delegates = {
///         "env." => Env,
///     },
/// };
///
/// let injector = Injector::new();
/// injector.register(&module).unwrap();
///
/// assert_eq!(Value::from("demo app"), injector.get("app.title").unwrap());
/// assert_eq!(Some(Value::from("prod")), injector.get_parameter("env"));
/// assert_eq!(Value::from("/home/demo"), injector.get("env.home").unwrap());
/// ```
#[macro_export]
macro_rules! define_module {
    {
        $($key:ident = $value:tt),*
        $(,)?
    } => {
        {
            #[allow(unused_mut)]
            let mut module = <$crate::Module as ::std::default::Default>::default();
            $($crate::define_module!(@add module, $key = $value);)*
            module
        }
    };
    (
        @add $module:expr,
        definitions = {
            $($id:expr => $definition:expr),*
            $(,)?
        }
    ) => {
        $($module.set($id, $definition);)*
    };
    (
        @add $module:expr,
        parameters = {
            $($param:expr => $value:expr),*
            $(,)?
        }
    ) => {
        $($module.parameter($param, $value);)*
    };
    (
        @add $module:expr,
        delegates = {
            $($prefix:expr => $delegate:expr),*
            $(,)?
        }
    ) => {
        $($module.delegate($prefix, $delegate);)*
    };
}
