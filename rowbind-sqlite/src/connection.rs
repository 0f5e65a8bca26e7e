use crate::extract::{SqliteValue, extract_value};
use rowbind_core::{
    Connection, Context, Error, Executor, Query, QueryResult, Result, Row, RowLabeled, RowNames,
    RowsAffected,
    stream::{self, Stream},
    truncate_long,
};
use rusqlite::{OpenFlags, params_from_iter};

/// Connection to a SQLite database.
///
/// Statements run to completion when submitted and their results are then
/// streamed from memory.
pub struct SqliteConnection {
    pub(crate) connection: rusqlite::Connection,
}

impl SqliteConnection {
    pub fn open_in_memory() -> Result<Self> {
        let connection = rusqlite::Connection::open_in_memory()
            .context("Could not open an in memory sqlite database")?;
        Ok(Self { connection })
    }

    pub fn inner(&self) -> &rusqlite::Connection {
        &self.connection
    }

    fn run_query(&mut self, query: &Query) -> Result<Vec<QueryResult>> {
        let mut statement = self.connection.prepare_cached(&query.sql)?;
        let params = params_from_iter(query.args.iter().map(SqliteValue));
        let count = statement.column_count();
        if count == 0 {
            let rows_affected = statement.execute(params)? as u64;
            return Ok(vec![QueryResult::Affected(RowsAffected {
                rows_affected,
                last_affected_id: Some(self.connection.last_insert_rowid()),
            })]);
        }
        let labels: RowNames = statement
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let mut rows = statement.query(params)?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let values = (0..count)
                .map(|i| row.get_ref(i).map(extract_value))
                .collect::<rusqlite::Result<Row>>()?;
            result.push(QueryResult::Row(RowLabeled::new(labels.clone(), values)));
        }
        Ok(result)
    }
}

impl Executor for SqliteConnection {
    fn run(&mut self, query: Query) -> impl Stream<Item = Result<QueryResult>> + Send {
        let items = match self.run_query(&query) {
            Ok(items) => items.into_iter().map(Ok).collect::<Vec<_>>(),
            Err(e) => {
                let error = e.context(format!(
                    "While executing the query:\n{}",
                    truncate_long!(query.sql)
                ));
                log::error!("{:#}", error);
                vec![Err(error)]
            }
        };
        stream::iter(items)
    }
}

impl Connection for SqliteConnection {
    async fn connect(url: &str) -> Result<SqliteConnection> {
        let prefix = "sqlite://";
        let Some(rest) = url.strip_prefix(prefix) else {
            let error = Error::msg(format!(
                "Expected sqlite connection url to start with `{}`",
                prefix
            ));
            log::error!("{}", error);
            return Err(error);
        };
        let context = || format!("Error while decoding connection URL: `{}`", url);
        let (path, params) = rest.split_once('?').unwrap_or((rest, ""));
        let path = urlencoding::decode(path).with_context(context)?;
        let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let mut memory = path == ":memory:";
        for (key, value) in url::form_urlencoded::parse(params.as_bytes()) {
            match (key.as_ref(), value.as_ref()) {
                ("mode", "rwc") => {}
                ("mode", "rw") => flags.remove(OpenFlags::SQLITE_OPEN_CREATE),
                ("mode", "ro") => {
                    flags.remove(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);
                    flags.insert(OpenFlags::SQLITE_OPEN_READ_ONLY);
                }
                ("mode", "memory") => memory = true,
                _ => {
                    let error = Error::msg(format!(
                        "Unsupported sqlite connection parameter `{}={}`",
                        key, value
                    ))
                    .context(context());
                    log::error!("{:#}", error);
                    return Err(error);
                }
            }
        }
        let connection = if memory {
            rusqlite::Connection::open_in_memory_with_flags(flags)
        } else {
            rusqlite::Connection::open_with_flags(&*path, flags)
        };
        let connection = connection.with_context(context).inspect_err(|e| {
            log::error!("{:#}", e);
        })?;
        Ok(Self { connection })
    }
}
