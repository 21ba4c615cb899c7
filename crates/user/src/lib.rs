mod command;
mod password;
mod query;
mod repository;

pub use command::*;
pub use query::*;
