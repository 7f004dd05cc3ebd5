use crate::{
    Arg, Args, CallArgs, InjectError, InjectResult, Injector, Parameter, Value,
};
use tracing::trace;

impl Injector {
    /// Produces the call arguments for a callable with the given parameters.
    ///
    /// Each parameter takes its supplied argument if there is one. Otherwise,
    /// a parameter with a declared type is resolved by that type, and a
    /// failure to do so fails the whole call. Parameters with neither are left
    /// out so the callee's own default applies.
    pub fn resolve_arguments(
        &self,
        parameters: &[Parameter],
        args: &Args,
    ) -> InjectResult<CallArgs> {
        let mut resolved = CallArgs::default();
        for parameter in parameters {
            if let Some(arg) = args.get(parameter.name()) {
                resolved.push(parameter.name(), self.resolve_argument(arg)?);
            } else if let Some(type_name) = parameter.declared_type()? {
                trace!(
                    parameter = parameter.name(),
                    type_name,
                    "resolving parameter by type"
                );
                resolved.push(parameter.name(), self.resolve_type(type_name)?);
            }
        }

        Ok(resolved)
    }

    /// Resolves a single raw argument. Lists and maps are resolved
    /// recursively, keeping their shape. A placeholder whose lookup misses,
    /// or finds only a null value, resolves to its literal text instead of
    /// failing.
    pub fn resolve_argument(&self, arg: &Arg) -> InjectResult<Value> {
        match arg {
            Arg::Value(value) => Ok(value.clone()),
            Arg::List(items) => items
                .iter()
                .map(|item| self.resolve_argument(item))
                .collect::<InjectResult<_>>()
                .map(Value::List),
            Arg::Map(entries) => entries
                .iter()
                .map(|(key, item)| -> InjectResult<(String, Value)> {
                    Ok((key.clone(), self.resolve_argument(item)?))
                })
                .collect::<InjectResult<_>>()
                .map(Value::Map),
            Arg::Service(id) => match self.get(id) {
                Ok(value) if !value.is_null() => Ok(value),
                Ok(_) => {
                    trace!(id = id.as_str(), "service placeholder resolved to null");
                    Ok(Value::Str(format!("%{}", id)))
                }
                Err(InjectError::NotFound { id: missing }) if &missing == id => {
                    trace!(id = id.as_str(), "service placeholder left unresolved");
                    Ok(Value::Str(format!("%{}", id)))
                }
                Err(error) => Err(error),
            },
            Arg::Parameter(key) => match self.get_parameter(key) {
                Some(value) if !value.is_null() => Ok(value),
                _ => {
                    trace!(key = key.as_str(), "parameter placeholder left unresolved");
                    Ok(Value::Str(format!(":{}", key)))
                }
            },
            Arg::Type(raw) => match self.resolve_type(raw) {
                Ok(value) => Ok(value),
                Err(InjectError::DependencyResolution { .. }) => {
                    trace!(type_name = raw.as_str(), "type placeholder left unresolved");
                    Ok(Value::Str(raw.clone()))
                }
                Err(error) => Err(error),
            },
        }
    }
}
