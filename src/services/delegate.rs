use crate::{InjectResult, Service, Value};

/// A container that lookups can be forwarded to. When an id requested from an
/// [`Injector`](crate::Injector) starts with a prefix registered through
/// [`Injector::delegate`](crate::Injector::delegate), both `has` and `get` are
/// answered by the delegate alone.
///
/// Every [`Injector`](crate::Injector) is itself a delegate, but any type can
/// act as one:
///
/// ```
/// use keyed_injector::{Delegate, InjectError, InjectResult, Injector, Value};
///
/// struct Env;
/// impl Delegate for Env {
///     fn has(&self, id: &str) -> bool {
///         id == "env.home"
///     }
///
///     fn get(&self, id: &str) -> InjectResult<Value> {
///         match id {
///             "env.home" => Ok(Value::from("/home/app")),
///             _ => Err(InjectError::NotFound { id: id.to_owned() }),
///         }
///     }
/// }
///
/// let injector = Injector::new();
/// injector.delegate("env.", Env);
///
/// assert!(injector.has("env.home"));
/// assert!(!injector.has("env.user"));
/// assert_eq!(Value::from("/home/app"), injector.get("env.home").unwrap());
/// ```
pub trait Delegate: Service {
    /// Whether this container can produce a value for `id`.
    fn has(&self, id: &str) -> bool;

    /// Produces the value for `id`, or [`InjectError::NotFound`](crate::InjectError::NotFound).
    fn get(&self, id: &str) -> InjectResult<Value>;
}
