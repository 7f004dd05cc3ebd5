mod arg;
mod resolver;

pub use arg::*;
