mod definition;
mod delegate;
mod descriptor;
mod parameters;
mod service;
mod value;

pub use definition::*;
pub use delegate::*;
pub use descriptor::*;
pub use parameters::*;
pub use service::*;
pub use value::*;
