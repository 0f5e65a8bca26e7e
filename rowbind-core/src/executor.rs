use crate::{
    Query, QueryResult, Result, RowLabeled, RowsAffected,
    stream::{Stream, StreamExt, TryStreamExt},
};
use futures::FutureExt;
use std::{future::Future, pin::pin};

/// Request/response primitive the engine runs its statements on.
pub trait Executor: Send {
    /// General method to send any query and return any result type (either row or count)
    fn run(&mut self, query: Query) -> impl Stream<Item = Result<QueryResult>> + Send;

    /// Execute the query and returns the rows.
    fn fetch(&mut self, query: Query) -> impl Stream<Item = Result<RowLabeled>> + Send {
        self.run(query).filter_map(|v| async move {
            match v {
                Ok(QueryResult::Row(v)) => Some(Ok(v)),
                Err(e) => Some(Err(e)),
                _ => None,
            }
        })
    }

    /// Execute the query and return the first row, if any.
    fn fetch_one(
        &mut self,
        query: Query,
    ) -> impl Future<Output = Result<Option<RowLabeled>>> + Send {
        let stream = self.fetch(query);
        async move { pin!(stream).into_future().map(|(v, _)| v).await.transpose() }
    }

    /// Execute the query and return the total number of rows affected.
    fn execute(&mut self, query: Query) -> impl Future<Output = Result<RowsAffected>> + Send {
        self.run(query)
            .filter_map(|v| async move {
                match v {
                    Ok(QueryResult::Affected(v)) => Some(Ok(v)),
                    Err(e) => Some(Err(e)),
                    _ => None,
                }
            })
            .try_collect()
    }
}

impl<E: Executor> Executor for &mut E {
    fn run(&mut self, query: Query) -> impl Stream<Item = Result<QueryResult>> + Send {
        (**self).run(query)
    }
}
