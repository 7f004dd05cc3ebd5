use crate::{InjectError, InjectResult, Service, Svc, Value};
use std::collections::BTreeMap;

/// A raw argument supplied by the caller for one parameter of an injected
/// callable. Placeholders are tagged when the argument is built, so a literal
/// string is never mistaken for a reference.
///
/// ```
/// use keyed_injector::{Arg, Value};
///
/// assert_eq!(Arg::service("db"), Arg::parse("%db"));
/// assert_eq!(Arg::parameter("dsn"), Arg::parse(":dsn"));
/// assert_eq!(Arg::type_ref("::app::Db"), Arg::parse("::app::Db"));
/// assert_eq!(Arg::Value(Value::from("plain")), Arg::parse("plain"));
///
/// // Literal strings stay literal.
/// assert_eq!(Arg::Value(Value::from("%db")), Arg::from("%db"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
    /// Passed through unchanged.
    Value(Value),
    /// Looked up by id on the injector.
    Service(String),
    /// Looked up in the parameter store.
    Parameter(String),
    /// Resolved by type, as written (qualifiers included).
    Type(String),
    /// Resolved element-wise.
    List(Vec<Arg>),
    /// Resolved entry-wise.
    Map(BTreeMap<String, Arg>),
}

impl Arg {
    #[must_use]
    pub fn service(id: impl Into<String>) -> Self {
        Arg::Service(id.into())
    }

    #[must_use]
    pub fn parameter(key: impl Into<String>) -> Self {
        Arg::Parameter(key.into())
    }

    #[must_use]
    pub fn type_ref(type_name: impl Into<String>) -> Self {
        Arg::Type(type_name.into())
    }

    /// Interprets the placeholder conventions of a raw string: `%id` refers to
    /// a definition, `:key` to a parameter, and a string starting with `::` or
    /// `\` to a type. Any other string is a literal.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if let Some(id) = raw.strip_prefix('%') {
            Arg::service(id)
        } else if raw.starts_with("::") || raw.starts_with('\\') {
            Arg::type_ref(raw)
        } else if let Some(key) = raw.strip_prefix(':') {
            Arg::parameter(key)
        } else {
            Arg::Value(Value::from(raw))
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

macro_rules! impl_literal_arg {
    ($($literal:ty),*) => {
        $(
            impl From<$literal> for Arg {
                fn from(value: $literal) -> Self {
                    Arg::Value(Value::from(value))
                }
            }
        )*
    };
}

impl_literal_arg!(bool, i32, i64, f64, &str, String);

impl From<Vec<Arg>> for Arg {
    fn from(items: Vec<Arg>) -> Self {
        Arg::List(items)
    }
}

impl From<BTreeMap<String, Arg>> for Arg {
    fn from(entries: BTreeMap<String, Arg>) -> Self {
        Arg::Map(entries)
    }
}

/// The arguments a caller supplies to an injected callable, keyed by parameter
/// name. Parameters without an entry are resolved by type if they declare one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args {
    args: BTreeMap<String, Arg>,
}

impl Args {
    #[must_use]
    pub fn new() -> Self {
        Args::default()
    }

    /// Supplies the argument for the parameter `name`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, arg: impl Into<Arg>) -> Self {
        self.args.insert(name.into(), arg.into());
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arg> {
        self.args.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

impl<K: Into<String>, A: Into<Arg>> FromIterator<(K, A)> for Args {
    fn from_iter<I: IntoIterator<Item = (K, A)>>(iter: I) -> Self {
        Args {
            args: iter
                .into_iter()
                .map(|(name, arg)| (name.into(), arg.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, A: Into<Arg>, const N: usize> From<[(K, A); N]> for Args {
    fn from(args: [(K, A); N]) -> Self {
        args.into_iter().collect()
    }
}

/// The resolved arguments handed to a callable, in parameter order. Each
/// entry keeps the name of the parameter it was resolved for.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallArgs {
    values: Vec<(String, Value)>,
}

impl CallArgs {
    pub(crate) fn push(&mut self, name: &str, value: Value) {
        self.values.push((name.to_owned(), value));
    }

    /// The value resolved for the parameter `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
    }

    /// The value resolved for `name`, or [`Value::Null`] if the parameter was
    /// left out.
    #[must_use]
    pub fn get_or_null(&self, name: &str) -> Value {
        self.get(name).cloned().unwrap_or_default()
    }

    /// The service instance resolved for `name`.
    pub fn object<T: Service>(&self, name: &str) -> InjectResult<Svc<T>> {
        let value = self.get(name).ok_or_else(|| {
            InjectError::invalid(format!("missing argument \"{}\"", name))
        })?;
        value.downcast().ok_or_else(|| {
            InjectError::invalid(format!(
                "argument \"{}\" is not an instance of {}",
                name,
                std::any::type_name::<T>()
            ))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Parameter names, in call order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The values in call order, without their names.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values.into_iter().map(|(_, value)| value).collect()
    }
}
