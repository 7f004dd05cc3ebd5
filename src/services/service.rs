#![allow(clippy::used_underscore_binding)]

use derive_more::{Display, Error};
use std::any::{Any, TypeId};

#[cfg(feature = "arc")]
mod types {
    use crate::InjectError;
    use std::{any::Any, sync::Arc};

    /// A reference-counted pointer holding a service. The pointer type is
    /// determined by the feature flags passed to this crate.
    pub type Svc<T> = Arc<T>;

    /// A reference-counted service pointer holding an instance of `dyn Any`.
    pub type DynSvc = Arc<dyn Any + Send + Sync>;

    /// A result from attempting to resolve a definition or inject the
    /// arguments of a callable.
    pub type InjectResult<T> = Result<T, InjectError>;

    /// Implemented automatically on types that are capable of being a service.
    pub trait Service: Any + Send + Sync {}
    impl<T: ?Sized + Any + Send + Sync> Service for T {}
}

#[cfg(feature = "rc")]
mod types {
    use crate::InjectError;
    use std::{any::Any, rc::Rc};

    /// A reference-counted pointer holding a service. The pointer type is
    /// determined by the feature flags passed to this crate.
    pub type Svc<T> = Rc<T>;

    /// A reference-counted service pointer holding an instance of `dyn Any`.
    pub type DynSvc = Rc<dyn Any>;

    /// A result from attempting to resolve a definition or inject the
    /// arguments of a callable.
    pub type InjectResult<T> = Result<T, InjectError>;

    /// Implemented automatically on types that are capable of being a service.
    pub trait Service: Any {}
    impl<T: ?Sized + Any> Service for T {}
}

pub use types::*;

/// Runtime identity of a service type: its [`TypeId`] and the name produced by
/// [`std::any::type_name`]. The name is what the type index is keyed by.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct ServiceInfo {
    id: TypeId,
    name: &'static str,
}

impl ServiceInfo {
    #[must_use]
    pub fn of<T: ?Sized + Any>() -> Self {
        ServiceInfo {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// An error raised by the injector. None of these are recovered internally,
/// with the single exception of placeholder arguments, which degrade to their
/// literal text when the lookup they name misses.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum InjectError {
    /// No definition exists for the requested id and no delegate claims it.
    #[display(fmt = "no definition found for \"{}\"", id)]
    NotFound { id: String },

    /// A definition was set twice for the same id.
    #[display(fmt = "a definition for \"{}\" already exists", id)]
    DuplicateDefinition { id: String },

    /// Type-based resolution found zero or several candidates, deep
    /// resolution was disabled or failed, or a parameter's type could not be
    /// determined.
    #[display(fmt = "failed to resolve dependency \"{}\"", type_name)]
    DependencyResolution { type_name: String },

    /// A caller passed a malformed target or argument to the injector.
    #[display(fmt = "invalid argument: {}", _0)]
    InvalidArgument(#[error(ignore)] String),
}

impl InjectError {
    pub(crate) fn not_found(id: &str) -> Self {
        InjectError::NotFound { id: id.to_owned() }
    }

    pub(crate) fn unresolved(type_name: &str) -> Self {
        InjectError::DependencyResolution {
            type_name: type_name.to_owned(),
        }
    }

    pub(crate) fn invalid(description: impl Into<String>) -> Self {
        InjectError::InvalidArgument(description.into())
    }
}
