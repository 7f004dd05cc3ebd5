use crate::{DynSvc, Service, ServiceInfo, Svc};
use std::{
    collections::BTreeMap,
    fmt::{Debug, Formatter},
};

/// A shared service instance together with the runtime identity of its
/// concrete type.
#[derive(Clone)]
pub struct Object {
    info: ServiceInfo,
    instance: DynSvc,
}

impl Object {
    /// Wraps a service pointer, remembering its concrete type.
    #[must_use]
    pub fn new<T: Service>(instance: Svc<T>) -> Self {
        Object {
            info: ServiceInfo::of::<T>(),
            instance,
        }
    }

    /// The concrete type of the instance.
    #[must_use]
    pub fn info(&self) -> ServiceInfo {
        self.info
    }

    /// Tries to recover a typed service pointer to the instance.
    #[must_use]
    pub fn downcast<T: Service>(&self) -> Option<Svc<T>> {
        self.instance.clone().downcast().ok()
    }

    /// Whether both objects point at the same instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Svc::ptr_eq(&self.instance, &other.instance)
    }
}

impl Debug for Object {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Object({})", self.info.name())
    }
}

/// A value held by a definition, stored as a parameter, or passed to a
/// callable as a resolved argument.
///
/// ```
/// use keyed_injector::Value;
///
/// let list = Value::from(vec![Value::from(1), Value::from("two")]);
/// assert_eq!(Some(1), list.as_list().and_then(|items| items[0].as_int()));
///
/// struct Clock;
/// let clock = Value::object(Clock);
/// assert!(clock.downcast::<Clock>().is_some());
/// assert!(clock.downcast::<String>().is_none());
/// ```
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(Object),
}

impl Value {
    /// Wraps a service instance in a new service pointer.
    #[must_use]
    pub fn object<T: Service>(instance: T) -> Self {
        Value::Object(Object::new(Svc::new(instance)))
    }

    /// Wraps an existing service pointer without reallocating it.
    #[must_use]
    pub fn from_svc<T: Service>(instance: Svc<T>) -> Self {
        Value::Object(Object::new(instance))
    }

    /// Tries to recover a typed service pointer from an object value.
    #[must_use]
    pub fn downcast<T: Service>(&self) -> Option<Svc<T>> {
        self.as_object().and_then(Object::downcast)
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

/// Objects compare by identity, everything else by value.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Value::Map(entries)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
