use crate::{Connection, Executor, Mapper, Result, SqlRunner, Transaction};

/// Database handle: the registry plus the default connection.
///
/// ```no_run
/// # async fn demo<C: rowbind_core::Connection>() -> rowbind_core::Result<()> {
/// use rowbind_core::{DbMap, GenericDialect, Mapper, SqlRunner};
/// let mut db = DbMap::<C>::connect("sqlite://:memory:", Mapper::new(GenericDialect)).await?;
/// db.create_tables_if_not_exists().await?;
/// let mut transaction = db.begin().await?;
/// transaction.exec("DELETE FROM invoice", ()).await?;
/// transaction.commit().await?;
/// # Ok(())
/// # }
/// ```
pub struct DbMap<C: Executor> {
    mapper: Mapper,
    connection: C,
}

impl<C: Connection> DbMap<C> {
    pub async fn connect(url: &str, mapper: Mapper) -> Result<Self> {
        let connection = C::connect(url).await?;
        Ok(Self::new(mapper, connection))
    }
}

impl<C: Executor> DbMap<C> {
    /// Also accepts `&mut C`, so that a handle can borrow an existing connection.
    pub fn new(mapper: Mapper, connection: C) -> Self {
        Self { mapper, connection }
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Registration access, tables are usually added right after connecting.
    pub fn mapper_mut(&mut self) -> &mut Mapper {
        &mut self.mapper
    }

    pub fn connection(&mut self) -> &mut C {
        &mut self.connection
    }

    pub fn into_parts(self) -> (Mapper, C) {
        (self.mapper, self.connection)
    }

    /// Start a transaction on the connection, it exposes the same operations
    /// as this handle until it is committed or rolled back.
    pub async fn begin(&mut self) -> Result<Transaction<'_, C>> {
        Transaction::begin(&self.mapper, &mut self.connection).await
    }
}

impl<C: Executor> SqlRunner for DbMap<C> {
    type Executor = C;

    fn parts(&mut self) -> Result<(&Mapper, &mut C)> {
        Ok((&self.mapper, &mut self.connection))
    }
}
