mod as_value;
mod cache;
mod column;
mod column_spec;
mod connection;
mod dialect;
mod driver;
mod error;
mod executor;
mod join;
mod model;
mod query;
mod relations;
pub mod schema;
mod sql_writer;
mod statement;
mod unit_of_work;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use cache::*;
pub use column::*;
pub use column_spec::*;
pub use connection::*;
pub use dialect::*;
pub use driver::*;
pub use error::*;
pub use executor::*;
pub use join::*;
pub use model::*;
pub use query::*;
pub use relations::*;
pub use schema::{DdlOutcome, DropBehavior, Schema, SchemaWriter};
pub use sql_writer::*;
pub use statement::*;
pub use unit_of_work::*;
pub use util::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
