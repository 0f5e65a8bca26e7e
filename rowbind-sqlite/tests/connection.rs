#[cfg(test)]
mod tests {
    use rowbind::{Connection, DbMap, Executor, Mapper, Query, SqlRunner, TransactionFinished};
    use rowbind_sqlite::{SqliteConnection, SqliteDialect};
    use rowbind_tests::{init_logs, silent_logs};
    use std::{path::Path, sync::Mutex};
    use tokio::fs;

    static MUTEX: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn create_database() {
        init_logs();
        const DB_PATH: &'static str = "../target/debug/creation.sqlite";
        let _guard = MUTEX.lock().unwrap();
        if Path::new(DB_PATH).exists() {
            fs::remove_file(DB_PATH)
                .await
                .expect(format!("Failed to remove test database file {}", DB_PATH).as_str());
        }
        assert!(
            !Path::new(DB_PATH).exists(),
            "Database file should not exist before test"
        );
        SqliteConnection::connect(&format!("sqlite://{}?mode=rwc", DB_PATH))
            .await
            .expect("Could not open the database");
        assert!(
            Path::new(DB_PATH).exists(),
            "Database file should be created after connection"
        );
        let mut connection = SqliteConnection::connect(&format!("sqlite://{}?mode=ro", DB_PATH))
            .await
            .expect("Could not open the database");
        silent_logs! {
            assert!(
                connection
                    .execute(Query::from("CREATE TABLE nope (id INTEGER);"))
                    .await
                    .is_err(),
                "A read only database cannot be written"
            );
        }
        drop(connection);
        fs::remove_file(DB_PATH)
            .await
            .expect(format!("Failed to remove existing test database file {}", DB_PATH).as_str());
        silent_logs! {
            assert!(
                SqliteConnection::connect(&format!("sqlite://{}?mode=ro", DB_PATH))
                    .await
                    .is_err(),
                "Should not be able to open in read only unexisting database"
            );
        }
    }

    #[tokio::test]
    async fn wrong_url() {
        silent_logs! {
            assert!(
                SqliteConnection::connect("postgres://some_value")
                    .await
                    .is_err()
            );
            assert!(
                SqliteConnection::connect("sqlite://:memory:?cache=shared")
                    .await
                    .is_err(),
                "Unknown parameters are rejected"
            );
        };
    }

    #[tokio::test]
    async fn statement_errors() {
        init_logs();
        let mut connection = SqliteConnection::connect("sqlite://:memory:")
            .await
            .expect("Could not open the in memory database");
        let affected = connection
            .execute(Query::from(
                "CREATE TABLE numbers (id INTEGER PRIMARY KEY, label TEXT);",
            ))
            .await
            .expect("Failed to create the table");
        assert_eq!(affected.rows_affected, 0);
        let affected = connection
            .execute(Query::new(
                "INSERT INTO numbers (label) VALUES (?);",
                vec!["one".into()],
            ))
            .await
            .expect("Failed to insert");
        assert_eq!(affected.rows_affected, 1);
        assert_eq!(affected.last_affected_id, Some(1));
        let row = connection
            .fetch_one(Query::from("SELECT id, label FROM numbers;"))
            .await
            .expect("Failed to fetch")
            .expect("The row must exist");
        assert_eq!(row.names(), ["id", "label"]);
        silent_logs! {
            assert!(
                connection
                    .execute(Query::from("SELECT * FROM missing_table;"))
                    .await
                    .is_err()
            );
        }
    }

    #[tokio::test]
    async fn failed_commit_can_be_rolled_back() {
        init_logs();
        let connection = SqliteConnection::connect("sqlite://:memory:")
            .await
            .expect("Could not open the in memory database");
        let mut db = DbMap::new(Mapper::new(SqliteDialect::new()), connection);
        for sql in [
            "PRAGMA foreign_keys = ON;",
            "CREATE TABLE parent (id INTEGER PRIMARY KEY);",
            "CREATE TABLE child (
                id INTEGER PRIMARY KEY,
                parent_id INTEGER REFERENCES parent(id) DEFERRABLE INITIALLY DEFERRED
            );",
        ] {
            db.exec(sql, ()).await.expect("Failed to prepare the schema");
        }
        {
            let mut tx = db.begin().await.expect("Failed to begin the transaction");
            tx.exec("INSERT INTO child (parent_id) VALUES (9);", ())
                .await
                .expect("The foreign key is checked at commit");
            silent_logs! {
                assert!(tx.commit().await.is_err(), "The orphan row violates the foreign key");
            }
            assert!(!tx.is_closed());
            tx.rollback().await.expect("Failed to roll back after the failed commit");
            assert!(tx.is_closed());
            let error = tx.rollback().await.expect_err("Already rolled back");
            assert!(error.downcast_ref::<TransactionFinished>().is_some());
        }
        {
            let mut tx = db
                .begin()
                .await
                .expect("The connection must be usable after the rollback");
            tx.commit().await.expect("Failed to commit the empty transaction");
        }
        assert_eq!(
            db.select_int("SELECT count(*) FROM child", ())
                .await
                .expect("Failed to count the children"),
            0
        );
    }
}
