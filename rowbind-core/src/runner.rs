use crate::{
    Args, AsValue, ConfigError, Context, Executor, FieldsNotFound, Mapper, Query, Record, Result,
    RowLabeled, RowsAffected, Value, crud, truncate_long,
};
use std::{any, collections::BTreeMap, future::Future};

/// Records materialized by a select, together with the partial mapping
/// diagnostic when some column or field was left out.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<T> {
    pub rows: Vec<T>,
    pub missing: Option<FieldsNotFound>,
}

impl<T> Selection<T> {
    pub fn into_rows(self) -> Vec<T> {
        self.rows
    }
    pub fn is_partial(&self) -> bool {
        self.missing.is_some()
    }
    /// The rows, or the partial mapping as an error.
    pub fn strict(self) -> Result<Vec<T>> {
        match self.missing {
            Some(missing) => Err(missing.into()),
            None => Ok(self.rows),
        }
    }
}

/// The CRUD contract shared by [`DbMap`](crate::DbMap) and
/// [`Transaction`](crate::Transaction).
///
/// Implementors only hand out the registry and the executor, every operation
/// is provided on top of them. Queries taking `args` expand `:name`
/// placeholders when the arguments are a map or a record.
pub trait SqlRunner: Send {
    type Executor: Executor;

    fn parts(&mut self) -> Result<(&Mapper, &mut Self::Executor)>;

    /// Load the row with the given primary key values.
    fn get<T: Record + Default>(
        &mut self,
        keys: impl IntoIterator<Item = Value>,
    ) -> impl Future<Output = Result<Option<T>>> + Send {
        let keys = keys.into_iter().collect::<Vec<_>>();
        async move {
            let (mapper, executor) = self.parts()?;
            crud::get(mapper, executor, keys).await
        }
    }

    /// Insert the records one after the other, autoincrement fields are
    /// written back. Stops at the first failure.
    fn insert<'r, R: Record + ?Sized>(
        &mut self,
        records: impl IntoIterator<Item = &'r mut R>,
    ) -> impl Future<Output = Result<()>> + Send {
        let records = records.into_iter().collect::<Vec<_>>();
        async move {
            let (mapper, executor) = self.parts()?;
            for record in records {
                crud::insert(mapper, executor, record.as_dyn_mut()).await?;
            }
            Ok(())
        }
    }

    /// Update the records by primary key, returns the total rows affected.
    fn update<'r, R: Record + ?Sized>(
        &mut self,
        records: impl IntoIterator<Item = &'r R>,
    ) -> impl Future<Output = Result<u64>> + Send {
        let records = records.into_iter().collect::<Vec<_>>();
        async move {
            let (mapper, executor) = self.parts()?;
            let mut total = 0;
            for record in records {
                total += crud::update(mapper, executor, record.as_dyn()).await?;
            }
            Ok(total)
        }
    }

    /// Delete the records by primary key, returns the total rows affected.
    fn delete<'r, R: Record + ?Sized>(
        &mut self,
        records: impl IntoIterator<Item = &'r R>,
    ) -> impl Future<Output = Result<u64>> + Send {
        let records = records.into_iter().collect::<Vec<_>>();
        async move {
            let (mapper, executor) = self.parts()?;
            let mut total = 0;
            for record in records {
                total += crud::delete(mapper, executor, record.as_dyn()).await?;
            }
            Ok(total)
        }
    }

    fn select<'a, T: Record + Default>(
        &mut self,
        query: &str,
        args: impl Into<Args<'a>>,
    ) -> impl Future<Output = Result<Selection<T>>> + Send {
        let args = args.into();
        async move {
            let mut rows = Vec::new();
            let (mapper, executor) = self.parts()?;
            let missing = crud::select(mapper, executor, query, args, &mut rows).await?;
            Ok(Selection { rows, missing })
        }
    }

    /// Same as [`SqlRunner::select`], appending to an existing vector.
    fn select_into<'a, T: Record + Default>(
        &mut self,
        out: &mut Vec<T>,
        query: &str,
        args: impl Into<Args<'a>>,
    ) -> impl Future<Output = Result<Option<FieldsNotFound>>> + Send {
        let args = args.into();
        async move {
            let (mapper, executor) = self.parts()?;
            crud::select(mapper, executor, query, args, out).await
        }
    }

    /// Values of the only column returned by the query.
    fn select_column<'a, V: AsValue + Send>(
        &mut self,
        query: &str,
        args: impl Into<Args<'a>>,
    ) -> impl Future<Output = Result<Vec<V>>> + Send {
        let args = args.into();
        async move {
            let (mapper, executor) = self.parts()?;
            crud::select_column(mapper, executor, query, args).await
        }
    }

    fn select_maps<'a>(
        &mut self,
        query: &str,
        args: impl Into<Args<'a>>,
    ) -> impl Future<Output = Result<Vec<BTreeMap<String, Value>>>> + Send {
        let args = args.into();
        async move {
            let (mapper, executor) = self.parts()?;
            crud::select_maps(mapper, executor, query, args).await
        }
    }

    /// Populate `holder` from the single row returned by the query.
    ///
    /// Fails with [`NoRows`](crate::NoRows) or [`MultipleRows`](crate::MultipleRows)
    /// otherwise, the holder is left untouched in both cases.
    fn select_one<'a, T: Record + ?Sized>(
        &mut self,
        holder: &mut T,
        query: &str,
        args: impl Into<Args<'a>>,
    ) -> impl Future<Output = Result<Option<FieldsNotFound>>> + Send {
        let args = args.into();
        async move {
            let (mapper, executor) = self.parts()?;
            crud::select_one(mapper, executor, holder.as_dyn_mut(), query, args).await
        }
    }

    /// Like [`SqlRunner::select_one`] but allocates the holder. A partial
    /// mapping is accepted.
    fn select_one_as<'a, T: Record + Default>(
        &mut self,
        query: &str,
        args: impl Into<Args<'a>>,
    ) -> impl Future<Output = Result<T>> + Send {
        let args = args.into();
        async move {
            let mut holder = T::default();
            let (mapper, executor) = self.parts()?;
            crud::select_one(mapper, executor, &mut holder, query, args).await?;
            Ok(holder)
        }
    }

    fn select_int<'a>(
        &mut self,
        query: &str,
        args: impl Into<Args<'a>>,
    ) -> impl Future<Output = Result<i64>> + Send {
        let future = self.select_null_int(query, args);
        async move { Ok(future.await?.unwrap_or_default()) }
    }

    fn select_null_int<'a>(
        &mut self,
        query: &str,
        args: impl Into<Args<'a>>,
    ) -> impl Future<Output = Result<Option<i64>>> + Send {
        let args = args.into();
        async move {
            let (mapper, executor) = self.parts()?;
            let value = crud::select_scalar::<Option<i64>, _>(mapper, executor, query, args).await?;
            Ok(value.flatten())
        }
    }

    fn select_float<'a>(
        &mut self,
        query: &str,
        args: impl Into<Args<'a>>,
    ) -> impl Future<Output = Result<f64>> + Send {
        let future = self.select_null_float(query, args);
        async move { Ok(future.await?.unwrap_or_default()) }
    }

    fn select_null_float<'a>(
        &mut self,
        query: &str,
        args: impl Into<Args<'a>>,
    ) -> impl Future<Output = Result<Option<f64>>> + Send {
        let args = args.into();
        async move {
            let (mapper, executor) = self.parts()?;
            let value = crud::select_scalar::<Option<f64>, _>(mapper, executor, query, args).await?;
            Ok(value.flatten())
        }
    }

    fn select_str<'a>(
        &mut self,
        query: &str,
        args: impl Into<Args<'a>>,
    ) -> impl Future<Output = Result<String>> + Send {
        let future = self.select_null_str(query, args);
        async move { Ok(future.await?.unwrap_or_default()) }
    }

    fn select_null_str<'a>(
        &mut self,
        query: &str,
        args: impl Into<Args<'a>>,
    ) -> impl Future<Output = Result<Option<String>>> + Send {
        let args = args.into();
        async move {
            let (mapper, executor) = self.parts()?;
            let value =
                crud::select_scalar::<Option<String>, _>(mapper, executor, query, args).await?;
            Ok(value.flatten())
        }
    }

    /// Run a statement that returns no rows.
    fn exec<'a>(
        &mut self,
        query: &str,
        args: impl Into<Args<'a>>,
    ) -> impl Future<Output = Result<RowsAffected>> + Send {
        let args = args.into();
        async move {
            let (mapper, executor) = self.parts()?;
            crud::exec(mapper, executor, query, args).await
        }
    }

    /// Raw labeled rows of the query.
    fn query<'a>(
        &mut self,
        query: &str,
        args: impl Into<Args<'a>>,
    ) -> impl Future<Output = Result<Vec<RowLabeled>>> + Send {
        let args = args.into();
        async move {
            let (mapper, executor) = self.parts()?;
            crud::query(mapper, executor, query, args).await
        }
    }

    /// Create every registered table, and its schema when it has one.
    fn create_tables(&mut self) -> impl Future<Output = Result<()>> + Send {
        run_statements(self, |mapper| Ok(create_statements(mapper, false)))
    }

    fn create_tables_if_not_exists(&mut self) -> impl Future<Output = Result<()>> + Send {
        run_statements(self, |mapper| Ok(create_statements(mapper, true)))
    }

    fn drop_tables(&mut self) -> impl Future<Output = Result<()>> + Send {
        run_statements(self, |mapper| Ok(drop_statements(mapper, false)))
    }

    fn drop_tables_if_exists(&mut self) -> impl Future<Output = Result<()>> + Send {
        run_statements(self, |mapper| Ok(drop_statements(mapper, true)))
    }

    /// Delete all rows of every registered table.
    fn truncate_tables(&mut self) -> impl Future<Output = Result<()>> + Send {
        run_statements(self, |mapper| {
            let dialect = mapper.dialect();
            Ok(mapper
                .tables()
                .iter()
                .map(|table| {
                    let mut out = String::new();
                    dialect.write_truncate_table(&mut out, table);
                    out
                })
                .collect())
        })
    }

    /// Create every index declared through `TableMap::add_index`.
    fn create_index(&mut self) -> impl Future<Output = Result<()>> + Send {
        run_statements(self, |mapper| {
            let dialect = mapper.dialect();
            let mut result = Vec::new();
            for table in mapper.tables() {
                for index in table.indexes() {
                    let mut out = String::new();
                    dialect.write_create_index(&mut out, table, index);
                    result.push(out);
                }
            }
            Ok(result)
        })
    }

    /// Drop the index `name` declared on the table of `T`.
    fn drop_index<T: Record>(&mut self, name: &str) -> impl Future<Output = Result<()>> + Send {
        run_statements(self, move |mapper| {
            let table = mapper.table_for(any::TypeId::of::<T>(), any::type_name::<T>(), false)?;
            let index = table.index(name).ok_or_else(|| {
                ConfigError::msg(format!(
                    "Table {} has no index named {}",
                    table.table_name(),
                    name
                ))
            })?;
            let mut out = String::new();
            mapper.dialect().write_drop_index(&mut out, table, index);
            Ok(vec![out])
        })
    }
}

async fn run_statements<R: SqlRunner + ?Sized>(
    runner: &mut R,
    build: impl FnOnce(&Mapper) -> Result<Vec<String>>,
) -> Result<()> {
    let (mapper, executor) = runner.parts()?;
    for sql in build(mapper)? {
        log::trace!("{}", truncate_long!(sql));
        executor
            .execute(Query::from(sql.as_str()))
            .await
            .with_context(|| format!("While executing `{}`", truncate_long!(sql)))?;
    }
    Ok(())
}

fn create_statements(mapper: &Mapper, if_not_exists: bool) -> Vec<String> {
    let dialect = mapper.dialect();
    let mut result = Vec::new();
    for table in mapper.tables() {
        if let Some(schema) = table.schema_name() {
            let mut out = String::new();
            dialect.write_create_schema(&mut out, schema, true);
            result.push(out);
        }
        let mut out = String::new();
        dialect.write_create_table(&mut out, table, if_not_exists);
        result.push(out);
    }
    result
}

fn drop_statements(mapper: &Mapper, if_exists: bool) -> Vec<String> {
    let dialect = mapper.dialect();
    mapper
        .tables()
        .iter()
        .rev()
        .map(|table| {
            let mut out = String::new();
            dialect.write_drop_table(&mut out, table, if_exists);
            out
        })
        .collect()
}
