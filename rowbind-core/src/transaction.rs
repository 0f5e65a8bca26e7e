use crate::{Context, Executor, Mapper, Query, Result, SqlRunner, TransactionFinished};

/// Transaction bound to a connection, offering the same operations as the
/// database handle.
///
/// Once committed or rolled back every further call fails with
/// [`TransactionFinished`]. A failed commit leaves it open, so it can still be
/// rolled back. Dropping it unfinished leaves the connection inside
/// the transaction and logs a warning.
pub struct Transaction<'a, C: Executor> {
    mapper: &'a Mapper,
    connection: &'a mut C,
    closed: bool,
}

impl<'a, C: Executor> Transaction<'a, C> {
    pub async fn begin(mapper: &'a Mapper, connection: &'a mut C) -> Result<Self> {
        let mut sql = String::new();
        mapper.dialect().write_transaction_begin(&mut sql);
        connection
            .execute(Query::from(sql))
            .await
            .context("While beginning a transaction")?;
        Ok(Self {
            mapper,
            connection,
            closed: false,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self, action: &str) -> Result<()> {
        if self.closed {
            log::warn!("Cannot {} a transaction that is already finished", action);
            return Err(TransactionFinished.into());
        }
        Ok(())
    }

    pub async fn commit(&mut self) -> Result<()> {
        self.ensure_open("commit")?;
        let mut sql = String::new();
        self.mapper.dialect().write_transaction_commit(&mut sql);
        self.connection
            .execute(Query::from(sql))
            .await
            .context("While committing the transaction")?;
        self.closed = true;
        Ok(())
    }

    pub async fn rollback(&mut self) -> Result<()> {
        self.ensure_open("rollback")?;
        let mut sql = String::new();
        self.mapper.dialect().write_transaction_rollback(&mut sql);
        self.connection
            .execute(Query::from(sql))
            .await
            .context("While rolling back the transaction")?;
        self.closed = true;
        Ok(())
    }

    pub async fn savepoint(&mut self, name: &str) -> Result<()> {
        self.ensure_open("create a savepoint in")?;
        let mut sql = String::new();
        self.mapper.dialect().write_savepoint(&mut sql, name);
        self.connection
            .execute(Query::from(sql))
            .await
            .with_context(|| format!("While creating savepoint {}", name))?;
        Ok(())
    }

    pub async fn rollback_to_savepoint(&mut self, name: &str) -> Result<()> {
        self.ensure_open("roll back a savepoint of")?;
        let mut sql = String::new();
        self.mapper.dialect().write_rollback_to_savepoint(&mut sql, name);
        self.connection
            .execute(Query::from(sql))
            .await
            .with_context(|| format!("While rolling back to savepoint {}", name))?;
        Ok(())
    }
}

impl<C: Executor> SqlRunner for Transaction<'_, C> {
    type Executor = C;

    fn parts(&mut self) -> Result<(&Mapper, &mut C)> {
        if self.closed {
            return Err(TransactionFinished.into());
        }
        Ok((self.mapper, &mut *self.connection))
    }
}

impl<C: Executor> Drop for Transaction<'_, C> {
    fn drop(&mut self) {
        if !self.closed {
            log::warn!("Transaction dropped without commit or rollback");
        }
    }
}
