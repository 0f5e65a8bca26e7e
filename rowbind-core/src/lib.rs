mod as_value;
mod bind;
mod column;
mod connection;
mod converter;
mod crud;
mod db_map;
mod dialect;
mod error;
mod executor;
mod index;
mod mapper;
mod materialize;
mod named;
mod query;
mod record;
mod runner;
mod table;
mod tag;
mod transaction;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use bind::*;
pub use column::*;
pub use connection::*;
pub use converter::*;
pub use db_map::*;
pub use dialect::*;
pub use error::*;
pub use executor::*;
pub use index::*;
pub use mapper::*;
pub use materialize::*;
pub use named::*;
pub use query::*;
pub use record::*;
pub use runner::*;
pub use table::*;
pub use tag::*;
pub use transaction::*;
pub use util::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
