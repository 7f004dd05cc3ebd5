//! Runtime dependency injection keyed by string ids.
//!
//! An [`Injector`] maps ids to [`Definition`]s: plain values, factories, or
//! classes built by constructor injection. Values are constructed lazily on
//! first request and, unless a definition is transient, cached and reused
//! after that.
//!
//! By default, values held by the `Injector` are not thread-safe. This is
//! because `Rc<T>` is used to hold service instances, which is not a
//! thread-safe pointer type. This can be changed by disabling default features
//! and enabling the "arc" feature:
//!
//! ```text
//! keyed_injector = {
//!     version = "*",
//!     default_features = false,
//!     features = ["arc"]
//! }
//! ```
//!
//! # Resolving arguments
//!
//! The injector can call constructors, methods, static methods and free
//! functions, supplying their arguments for them. Each parameter takes the
//! argument the caller supplied for it by name. Arguments can be placeholders:
//!
//! - `%id` resolves to the definition registered under `id`,
//! - `:key` resolves to the parameter stored under `key`,
//! - `::path::Type` (or `\Path\Type`) resolves to the single definition
//!   known to produce that type.
//!
//! A placeholder that cannot be looked up is passed through as its literal
//! text. A parameter with no supplied argument is resolved by its declared
//! type, if it has one, and is otherwise left out so the callee's own default
//! applies.
//!
//! Parameters are described explicitly through [`Parameter`], [`Function`]
//! and [`Class`], since Rust has no runtime reflection over signatures.
//!
//! # Prefix delegation
//!
//! Ids starting with a registered prefix are forwarded to a [`Delegate`],
//! which can be another injector. A delegated id is never looked up locally,
//! even if the delegate doesn't have it.
//!
//! # Example
//!
//! ```
//! use keyed_injector::{
//!     Arg, Args, Class, Definition, Injector, Parameter, Parameters, Svc,
//!     Value,
//! };
//! use std::error::Error;
//!
//! struct Config {
//!     dsn: String,
//! }
//!
//! struct Database {
//!     config: Svc<Config>,
//!     pool_size: i64,
//! }
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     let injector = Injector::builder()
//!         .parameters(Parameters::new().with("pool_size", 4))
//!         .build();
//!
//!     // Describe how to build a database. Its config is resolved by type,
//!     // and its pool size is supplied by the caller.
//!     injector.define_class(
//!         Class::of::<Database>().constructor(
//!             [
//!                 Parameter::new("config").of::<Config>(),
//!                 Parameter::new("pool_size"),
//!             ],
//!             |_, args| {
//!                 Ok(Database {
//!                     config: args.object("config")?,
//!                     pool_size: args
//!                         .get("pool_size")
//!                         .and_then(Value::as_int)
//!                         .unwrap_or(1),
//!                 })
//!             },
//!         ),
//!     );
//!
//!     // Nothing is constructed until it is requested.
//!     injector
//!         .set("config", Value::object(Config { dsn: "sqlite::memory:".into() }))?
//!         .set(
//!             "db",
//!             Definition::class(
//!                 std::any::type_name::<Database>(),
//!                 Args::new().with("pool_size", Arg::parse(":pool_size")),
//!             ),
//!         )?;
//!
//!     let db: Svc<Database> = injector.get("db")?.downcast().unwrap();
//!     assert_eq!("sqlite::memory:", db.config.dsn);
//!     assert_eq!(4, db.pool_size);
//!
//!     // Singletons are reused.
//!     assert_eq!(injector.get("db")?, injector.get("db")?);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::needless_pass_by_value
)]

#[cfg(not(any(feature = "arc", feature = "rc")))]
compile_error!(
    "Either the 'arc' or 'rc' feature must be enabled (but not both)."
);

#[cfg(all(feature = "arc", feature = "rc"))]
compile_error!(
    "The 'arc' and 'rc' features are mutually exclusive and cannot be enabled together."
);

mod builder;
mod injector;
mod invoke;
mod module;
mod requests;
mod services;

pub use builder::*;
pub use injector::*;
pub use invoke::*;
pub use module::*;
pub use requests::*;
pub use services::*;

#[cfg(test)]
mod tests;
