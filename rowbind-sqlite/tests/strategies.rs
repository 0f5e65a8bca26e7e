#[cfg(test)]
mod tests {
    use rowbind::{
        ConfigError, DbMap, GenericDialect, Mapper, PlanKind, Record, SqlRunner, values,
    };
    use rowbind_sqlite::{AutoIncrStrategy, SqliteConnection, SqliteDialect};
    use rowbind_tests::init_logs;

    #[derive(Record, Default, Debug, Clone, PartialEq)]
    struct Ticket {
        #[db("id, primarykey, autoincrement")]
        id: i64,
        #[db("title, size:80")]
        title: String,
    }

    #[derive(Record, Default, Debug, Clone, PartialEq)]
    struct Counter {
        #[db("id, primarykey, autoincrement")]
        id: u32,
    }

    #[tokio::test]
    async fn returning_clause() {
        init_logs();
        let mut mapper = Mapper::new(SqliteDialect::with_strategy(AutoIncrStrategy::Returning));
        mapper.add_table::<Ticket>().expect("Failed to register Ticket");
        let table = mapper.table::<Ticket>().expect("Ticket is registered");
        assert_eq!(
            table.plan(PlanKind::Insert, mapper.dialect()).query,
            r#"INSERT INTO "Ticket" ("id", "title") VALUES (NULL, ?) RETURNING "id";"#
        );
        let mapper = Mapper::new(SqliteDialect::new());
        let mut mapper = mapper;
        mapper.add_table::<Ticket>().expect("Failed to register Ticket");
        let table = mapper.table::<Ticket>().expect("Ticket is registered");
        assert_eq!(
            table.plan(PlanKind::Insert, mapper.dialect()).query,
            r#"INSERT INTO "Ticket" ("id", "title") VALUES (NULL, ?);"#
        );
    }

    #[tokio::test]
    async fn unsigned_ids() {
        init_logs();
        let connection = SqliteConnection::open_in_memory().expect("Could not open the database");
        let mut mapper = Mapper::new(SqliteDialect::new());
        mapper.add_table::<Counter>().expect("Failed to register Counter");
        let mut db = DbMap::new(mapper, connection);
        db.create_tables().await.expect("Failed to create the table");
        let mut counters = [Counter::default(), Counter::default()];
        let [first, second] = &mut counters;
        db.insert([first, second]).await.expect("Failed to insert");
        assert_eq!(counters, [Counter { id: 1 }, Counter { id: 2 }]);
        assert!(
            db.get::<Counter>(values![2u32])
                .await
                .expect("Failed to get")
                .is_some()
        );
    }

    #[tokio::test]
    async fn custom_id_query() {
        init_logs();
        let connection = SqliteConnection::open_in_memory().expect("Could not open the database");
        let mut mapper = Mapper::new(SqliteDialect::with_strategy(AutoIncrStrategy::Query));
        mapper
            .add_table::<Ticket>()
            .expect("Failed to register Ticket")
            .column_mut("id")
            .expect("Ticket has an id column")
            .set_generated_id_query("SELECT max(id) + 100 FROM ticket;");
        let mut db = DbMap::new(mapper, connection);
        db.create_tables().await.expect("Failed to create the table");
        let mut ticket = Ticket {
            title: "offset id".into(),
            ..Default::default()
        };
        db.insert([&mut ticket]).await.expect("Failed to insert");
        assert_eq!(ticket.id, 101);
    }

    #[tokio::test]
    async fn unsupported_autoincrement() {
        init_logs();
        let connection = SqliteConnection::open_in_memory().expect("Could not open the database");
        let mut mapper = Mapper::new(GenericDialect);
        mapper.add_table::<Ticket>().expect("Failed to register Ticket");
        let mut db = DbMap::new(mapper, connection);
        db.create_tables().await.expect("Failed to create the table");
        let mut ticket = Ticket {
            title: "no id".into(),
            ..Default::default()
        };
        let error = db
            .insert([&mut ticket])
            .await
            .expect_err("The generic dialect cannot read back ids");
        let config = error
            .downcast_ref::<ConfigError>()
            .expect("Must be a configuration error");
        assert!(config.0.contains("generic"), "{}", config);
        assert_eq!(ticket.id, 0);
        let count = db
            .select_int("select count(*) from ticket", ())
            .await
            .expect("Failed to count the tickets");
        assert_eq!(count, 0, "Nothing is written when the id cannot be read back");
    }
}
