mod blob;
mod command;
mod document;
mod locks;
mod query;
mod realtime;
mod repository;
mod types;

pub use blob::*;
pub use command::*;
pub use document::*;
pub use locks::*;
pub use query::*;
pub use realtime::*;
pub use types::*;
