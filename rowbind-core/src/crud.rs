use crate::{
    Args, AsValue, ConfigError, Context, Error, Executor, FieldsNotFound, Mapper, MultipleRows,
    NoRows, PlanKind, Query, Record, Result, RowLabeled, RowMapping, RowsAffected, Value,
    expand_named_query, scan_field, truncate_long,
};
use futures::TryStreamExt;
use std::{
    any::{self, TypeId},
    collections::BTreeMap,
    pin::pin,
};

fn named_query(mapper: &Mapper, query: &str, args: Args) -> Query {
    let (sql, values) = expand_named_query(mapper.dialect(), query, args);
    log::trace!("{}", truncate_long!(sql));
    Query::new(sql, values)
}

pub(crate) async fn get<T: Record + Default, E: Executor>(
    mapper: &Mapper,
    executor: &mut E,
    keys: Vec<Value>,
) -> Result<Option<T>> {
    let table = mapper.table_for(TypeId::of::<T>(), any::type_name::<T>(), true)?;
    let plan = table.plan(PlanKind::Get, mapper.dialect());
    if keys.len() != plan.key_fields.len() {
        return Err(Error::msg(format!(
            "Table {} has {} key columns but {} values were provided",
            table.table_name(),
            plan.key_fields.len(),
            keys.len()
        )));
    }
    log::trace!("{}", truncate_long!(plan.query));
    let Some(row) = executor
        .fetch_one(Query::new(plan.query.as_str(), keys))
        .await
        .with_context(|| format!("While getting a row from {}", table.table_name()))?
    else {
        return Ok(None);
    };
    let mut record = T::default();
    let converter = mapper.type_converter();
    for (field, value) in plan.arg_fields.iter().zip(row.values.into_vec()) {
        let Some(column) = table.column_by_field(field) else {
            continue;
        };
        scan_field(&mut record, field, column.value(), value, converter)?;
    }
    Ok(Some(record))
}

pub(crate) async fn insert<E: Executor>(
    mapper: &Mapper,
    executor: &mut E,
    record: &mut dyn Record,
) -> Result<()> {
    let table = mapper.table_for(record.record_type(), record.type_name(), false)?;
    let dialect = mapper.dialect();
    let converter = mapper.type_converter();
    let plan = table.plan(PlanKind::Insert, dialect);
    let instance = plan.create_bind_instance(&*record, converter)?;
    let target = instance.auto_incr_field_name;
    let query = instance.into_query();
    log::trace!("{}", query);
    let context = || format!("While inserting into {}", table.table_name());
    let Some(field) = target else {
        executor.execute(query).await.with_context(context)?;
        return Ok(());
    };
    let Some(column) = table.column_by_field(field) else {
        return Err(Error::msg(format!(
            "Autoincrement field `{}` is not a column of {}",
            field,
            table.table_name()
        )));
    };
    if let Some(inserter) = dialect.integer_auto_incr() {
        let result = executor.execute(query).await.with_context(context)?;
        let id = inserter.inserted_id(&result).ok_or_else(|| {
            Error::msg(format!(
                "The database did not report the id generated for {}",
                table.table_name()
            ))
        })?;
        let sample = column.value();
        let value = if sample.is_unsigned_integer() {
            let id = u64::try_from(id).map_err(|_| {
                Error::msg(format!(
                    "Generated id {} does not fit the unsigned field `{}`",
                    id, field
                ))
            })?;
            Value::UInt64(Some(id))
        } else if sample.is_signed_integer() {
            Value::Int64(Some(id))
        } else {
            return Err(Error::msg(format!(
                "Cannot store the generated id into the non integer field `{}`",
                field
            )));
        };
        record
            .set_field(field, value)
            .with_context(|| format!("Could not assign generated id to `{}`", field))?;
    } else if let Some(inserter) = dialect.targeted_auto_incr() {
        let row = executor
            .fetch_one(query)
            .await
            .with_context(context)?
            .ok_or(NoRows)
            .with_context(context)?;
        let value = inserter.inserted_value(row).ok_or_else(|| {
            Error::msg(format!("The insert into {} returned no value", table.table_name()))
        })?;
        scan_field(record, field, column.value(), value, converter)?;
    } else if let Some(inserter) = dialect.query_auto_incr() {
        let Some(id_query) = inserter.id_query(column) else {
            return Err(ConfigError::msg(format!(
                "Column {} of {} needs a generated id query for dialect {}",
                column.column_name(),
                table.table_name(),
                dialect.name()
            )));
        };
        let id_query = Query::from(id_query);
        executor.execute(query).await.with_context(context)?;
        let row = executor
            .fetch_one(id_query)
            .await
            .with_context(context)?
            .ok_or(NoRows)
            .with_context(context)?;
        let value = row.values.into_vec().into_iter().next().unwrap_or_default();
        scan_field(record, field, column.value(), value, converter)?;
    } else {
        return Err(ConfigError::msg(format!(
            "Dialect {} cannot read back autoincrement values (table {})",
            dialect.name(),
            table.table_name()
        )));
    }
    Ok(())
}

pub(crate) async fn update<E: Executor>(
    mapper: &Mapper,
    executor: &mut E,
    record: &dyn Record,
) -> Result<u64> {
    let table = mapper.table_for(record.record_type(), record.type_name(), true)?;
    let plan = table.plan(PlanKind::Update, mapper.dialect());
    if plan.set_count() == 0 {
        return Err(ConfigError::msg(format!(
            "Table {} has no columns to update",
            table.table_name()
        )));
    }
    let query = plan
        .create_bind_instance(record, mapper.type_converter())?
        .into_query();
    log::trace!("{}", query);
    let result = executor
        .execute(query)
        .await
        .with_context(|| format!("While updating {}", table.table_name()))?;
    Ok(result.rows_affected)
}

pub(crate) async fn delete<E: Executor>(
    mapper: &Mapper,
    executor: &mut E,
    record: &dyn Record,
) -> Result<u64> {
    let table = mapper.table_for(record.record_type(), record.type_name(), true)?;
    let plan = table.plan(PlanKind::Delete, mapper.dialect());
    let query = plan
        .create_bind_instance(record, mapper.type_converter())?
        .into_query();
    log::trace!("{}", query);
    let result = executor
        .execute(query)
        .await
        .with_context(|| format!("While deleting from {}", table.table_name()))?;
    Ok(result.rows_affected)
}

/// Materializes every row into a new `T`.
pub(crate) async fn select<T: Record + Default, E: Executor>(
    mapper: &Mapper,
    executor: &mut E,
    query: &str,
    args: Args<'_>,
    out: &mut Vec<T>,
) -> Result<Option<FieldsNotFound>> {
    let query = named_query(mapper, query, args);
    let converter = mapper.type_converter();
    let stream = executor.fetch(query);
    let mut stream = pin!(stream);
    let mut mapping = None;
    while let Some(row) = stream.try_next().await? {
        let mapping = mapping.get_or_insert_with(|| {
            RowMapping::resolve(
                mapper,
                T::fields(),
                TypeId::of::<T>(),
                any::type_name::<T>(),
                row.names(),
            )
        });
        let mut record = T::default();
        mapping.scan(&mut record, row, converter)?;
        out.push(record);
    }
    Ok(mapping.and_then(RowMapping::into_missing))
}

/// Populates `holder` from the single row returned by the query.
pub(crate) async fn select_one<E: Executor>(
    mapper: &Mapper,
    executor: &mut E,
    holder: &mut dyn Record,
    query: &str,
    args: Args<'_>,
) -> Result<Option<FieldsNotFound>> {
    let query = named_query(mapper, query, args);
    let row = {
        let stream = executor.fetch(query);
        let mut stream = pin!(stream);
        let Some(row) = stream.try_next().await? else {
            return Err(NoRows.into());
        };
        if stream.try_next().await?.is_some() {
            return Err(MultipleRows.into());
        }
        row
    };
    let mapping = RowMapping::resolve(
        mapper,
        holder.field_defs(),
        holder.record_type(),
        holder.type_name(),
        row.names(),
    );
    mapping.scan(holder, row, mapper.type_converter())?;
    Ok(mapping.into_missing())
}

pub(crate) async fn select_column<V: AsValue, E: Executor>(
    mapper: &Mapper,
    executor: &mut E,
    query: &str,
    args: Args<'_>,
) -> Result<Vec<V>> {
    let query = named_query(mapper, query, args);
    executor
        .fetch(query)
        .and_then(|row| async move { single_value(row).and_then(V::try_from_value) })
        .try_collect()
        .await
}

pub(crate) async fn select_maps<E: Executor>(
    mapper: &Mapper,
    executor: &mut E,
    query: &str,
    args: Args<'_>,
) -> Result<Vec<BTreeMap<String, Value>>> {
    let query = named_query(mapper, query, args);
    executor
        .fetch(query)
        .map_ok(|row| {
            row.labels
                .iter()
                .cloned()
                .zip(row.values.into_vec())
                .collect::<BTreeMap<_, _>>()
        })
        .try_collect()
        .await
}

/// First value of the first row, `None` when the query returns no rows.
pub(crate) async fn select_scalar<V: AsValue, E: Executor>(
    mapper: &Mapper,
    executor: &mut E,
    query: &str,
    args: Args<'_>,
) -> Result<Option<V>> {
    let query = named_query(mapper, query, args);
    let Some(row) = executor.fetch_one(query).await? else {
        return Ok(None);
    };
    single_value(row).and_then(V::try_from_value).map(Some)
}

pub(crate) async fn exec<E: Executor>(
    mapper: &Mapper,
    executor: &mut E,
    query: &str,
    args: Args<'_>,
) -> Result<RowsAffected> {
    let query = named_query(mapper, query, args);
    executor.execute(query).await
}

pub(crate) async fn query<E: Executor>(
    mapper: &Mapper,
    executor: &mut E,
    query: &str,
    args: Args<'_>,
) -> Result<Vec<RowLabeled>> {
    let query = named_query(mapper, query, args);
    executor.fetch(query).try_collect().await
}

fn single_value(row: RowLabeled) -> Result<Value> {
    if row.values.len() != 1 {
        return Err(Error::msg(format!(
            "Expected a single column but the query returned {} ({})",
            row.values.len(),
            row.labels.join(", ")
        )));
    }
    Ok(row.values.into_vec().into_iter().next().unwrap_or_default())
}
