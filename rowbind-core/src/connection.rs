use crate::{Executor, Result};
use std::future::Future;

pub trait Connection: Executor + Sized {
    /// Open a connection to the database at the given URL.
    fn connect(url: &str) -> impl Future<Output = Result<Self>> + Send;
}
