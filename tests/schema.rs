#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rowbind::{
        ConfigError, Dialect, GenericDialect, Mapper, MissingKeys, MySqlDialect, PostgresDialect,
        Record, TableMap, TableNotFound, Value,
    };
    use std::any::{self, TypeId};

    #[derive(Record, Default, Debug, Clone, PartialEq)]
    struct Invoice {
        #[db("id, primarykey, autoincrement")]
        id: i64,
        #[db("created, notnull")]
        created: i64,
        #[db("memo, size:200")]
        memo: String,
        paid: Option<bool>,
        #[db("-")]
        cache: String,
    }

    #[derive(Record, Default, Debug, Clone, PartialEq)]
    struct Keyless {
        label: String,
    }

    #[derive(Record, Default, Debug, Clone, PartialEq)]
    struct TwoCounters {
        #[db("first, autoincrement")]
        first: i64,
        #[db("second, autoincrement")]
        second: i64,
    }

    #[derive(Record, Default, Debug, Clone, PartialEq)]
    struct TextCounter {
        #[db("id, primarykey, autoincrement")]
        id: String,
    }

    fn create_table(dialect: &dyn Dialect, table: &TableMap, if_not_exists: bool) -> String {
        let mut out = String::new();
        dialect.write_create_table(&mut out, table, if_not_exists);
        out
    }

    #[test]
    fn create_table_generic() {
        let mut mapper = Mapper::new(GenericDialect);
        mapper.add_table_with_name::<Invoice>("invoice").unwrap();
        let table = mapper.table::<Invoice>().unwrap();
        assert_eq!(
            create_table(mapper.dialect(), table, false),
            indoc! {r#"
                CREATE TABLE "invoice" (
                    "id" BIGINT NOT NULL PRIMARY KEY,
                    "created" BIGINT NOT NULL,
                    "memo" VARCHAR(200),
                    "paid" BOOLEAN
                );"#}
        );
    }

    #[test]
    fn create_table_postgres() {
        let mut mapper = Mapper::new(PostgresDialect);
        let table = mapper
            .add_table_with_name_and_schema::<Invoice>("billing", "invoice")
            .unwrap();
        table.set_unique_together(&["created", "memo"]).unwrap();
        let table = mapper.table::<Invoice>().unwrap();
        assert_eq!(
            create_table(mapper.dialect(), table, true),
            indoc! {r#"
                CREATE TABLE IF NOT EXISTS "billing"."invoice" (
                    "id" BIGSERIAL NOT NULL PRIMARY KEY,
                    "created" BIGINT NOT NULL,
                    "memo" VARCHAR(200),
                    "paid" BOOLEAN,
                    UNIQUE ("created", "memo")
                );"#}
        );
        let mut out = String::new();
        mapper.dialect().write_create_schema(&mut out, "billing", true);
        assert_eq!(out, r#"CREATE SCHEMA IF NOT EXISTS "billing";"#);
    }

    #[test]
    fn create_table_mysql() {
        let mut mapper = Mapper::new(MySqlDialect::default());
        mapper.add_table_with_name::<Invoice>("invoice").unwrap();
        let table = mapper.table::<Invoice>().unwrap();
        assert_eq!(
            create_table(mapper.dialect(), table, false),
            indoc! {"
                CREATE TABLE `invoice` (
                    `id` BIGINT NOT NULL PRIMARY KEY AUTO_INCREMENT,
                    `created` BIGINT NOT NULL,
                    `memo` VARCHAR(200),
                    `paid` BOOLEAN
                ) ENGINE=InnoDB CHARSET=utf8mb4;"}
        );
    }

    #[test]
    fn drop_truncate_and_indexes() {
        let mut mapper = Mapper::new(MySqlDialect::default());
        let index = mapper
            .add_table_with_name::<Invoice>("invoice")
            .unwrap()
            .add_index("invoice_memo_idx", &["memo", "created"])
            .unwrap();
        index.set_unique(true);
        let table = mapper.table::<Invoice>().unwrap();
        let dialect = mapper.dialect();
        let index = table.index("invoice_memo_idx").unwrap();

        let mut out = String::new();
        dialect.write_create_index(&mut out, table, index);
        assert_eq!(
            out,
            "CREATE UNIQUE INDEX `invoice_memo_idx` ON `invoice` (`memo`, `created`);"
        );
        out.clear();
        dialect.write_drop_index(&mut out, table, index);
        assert_eq!(out, "DROP INDEX `invoice_memo_idx` ON `invoice`;");
        out.clear();
        dialect.write_drop_table(&mut out, table, true);
        assert_eq!(out, "DROP TABLE IF EXISTS `invoice`;");
        out.clear();
        dialect.write_truncate_table(&mut out, table);
        assert_eq!(out, "TRUNCATE `invoice`;");

        let mut mapper = Mapper::new(PostgresDialect);
        mapper
            .add_table_with_name::<Invoice>("invoice")
            .unwrap()
            .add_index("invoice_paid_idx", &["paid"])
            .unwrap()
            .set_index_type("BRIN");
        let table = mapper.table::<Invoice>().unwrap();
        let mut out = String::new();
        mapper
            .dialect()
            .write_create_index(&mut out, table, &table.indexes()[0]);
        assert_eq!(
            out,
            r#"CREATE INDEX "invoice_paid_idx" ON "invoice" USING BRIN ("paid");"#
        );
    }

    #[test]
    fn registration_is_idempotent() {
        let mut mapper = Mapper::new(GenericDialect);
        let first = mapper.add_table::<Invoice>().unwrap() as *const TableMap;
        assert_eq!(mapper.table::<Invoice>().unwrap().table_name(), "Invoice");
        let second = mapper
            .add_table_with_name::<Invoice>("invoices")
            .unwrap() as *const TableMap;
        assert_eq!(first, second);
        assert_eq!(mapper.tables().len(), 1);
        let table = mapper.table::<Invoice>().unwrap();
        assert_eq!(table.table_name(), "invoices");
        assert_eq!(table.schema_name(), None);
        assert_eq!(table.type_id(), TypeId::of::<Invoice>());
    }

    #[test]
    fn registered_columns() {
        let mut mapper = Mapper::new(GenericDialect);
        mapper.add_table::<Invoice>().unwrap();
        let table = mapper.table::<Invoice>().unwrap();
        let names = table
            .columns()
            .iter()
            .map(|c| c.column_name())
            .collect::<Vec<_>>();
        assert_eq!(names, ["id", "created", "memo", "paid", "cache"]);
        assert!(table.column("cache").unwrap().is_transient());
        let id = table.column("id").unwrap();
        assert!(id.is_primary_key());
        assert!(id.is_auto_increment());
        assert!(matches!(id.value(), Value::Int64(None)));
        let paid = table.column("paid").unwrap();
        assert!(paid.is_nullable());
        assert!(!paid.is_not_null());
        assert_eq!(table.column("memo").unwrap().max_size(), Some(200));
        assert_eq!(table.keys().count(), 1);
    }

    #[test]
    fn lookup_errors() {
        let mut mapper = Mapper::new(GenericDialect);
        let error = mapper
            .table_for(TypeId::of::<Invoice>(), any::type_name::<Invoice>(), false)
            .expect_err("Invoice is not registered");
        assert!(error.downcast_ref::<TableNotFound>().is_some());

        mapper.add_table::<Keyless>().unwrap();
        assert!(
            mapper
                .table_for(TypeId::of::<Keyless>(), "Keyless", false)
                .is_ok()
        );
        let error = mapper
            .table_for(TypeId::of::<Keyless>(), "Keyless", true)
            .expect_err("Keyless has no primary key");
        assert_eq!(
            error.downcast_ref::<MissingKeys>(),
            Some(&MissingKeys {
                table_name: "Keyless".into()
            })
        );
    }

    #[test]
    fn invalid_autoincrement() {
        let mut mapper = Mapper::new(GenericDialect);
        let error = mapper
            .add_table::<TwoCounters>()
            .expect_err("Only one autoincrement field is allowed");
        assert!(error.downcast_ref::<ConfigError>().is_some());
        let error = mapper
            .add_table::<TextCounter>()
            .expect_err("Autoincrement needs an integer field");
        assert!(error.downcast_ref::<ConfigError>().is_some());
        assert!(mapper.tables().is_empty());
    }

    #[test]
    fn set_keys() {
        let mut mapper = Mapper::new(GenericDialect);
        let table = mapper.add_table::<Invoice>().unwrap();
        assert!(table.set_keys(false, &[]).is_err());
        assert!(table.set_keys(true, &["id", "created"]).is_err());
        assert!(table.set_keys(true, &["memo"]).is_err());
        assert!(table.set_keys(false, &["missing"]).is_err());
        // Failed calls leave the key as it was
        assert_eq!(
            table.keys().map(|c| c.column_name()).collect::<Vec<_>>(),
            ["id"]
        );

        table.set_keys(false, &["created", "memo"]).unwrap();
        assert_eq!(
            table.keys().map(|c| c.column_name()).collect::<Vec<_>>(),
            ["created", "memo"]
        );
        let id = table.column("id").unwrap();
        assert!(!id.is_primary_key());
        assert!(!id.is_auto_increment());

        let mut mapper = Mapper::new(GenericDialect);
        let table = mapper.add_table::<Keyless>().unwrap();
        assert!(!table.has_keys());
        table.set_keys(false, &["label"]).unwrap();
        assert!(table.has_keys());
    }

    #[test]
    fn unique_and_index_errors() {
        let mut mapper = Mapper::new(GenericDialect);
        let table = mapper.add_table::<Invoice>().unwrap();
        assert!(table.set_unique_together(&["memo"]).is_err());
        assert!(table.set_unique_together(&["memo", "nope"]).is_err());
        table.set_unique_together(&["memo", "created"]).unwrap();
        let error = table
            .set_unique_together(&["created", "memo"])
            .expect_err("Same group in another order");
        assert!(error.downcast_ref::<ConfigError>().is_some());
        assert_eq!(table.unique_together(), [vec!["memo", "created"]]);

        assert!(table.add_index("empty_idx", &[]).is_err());
        assert!(table.add_index("missing_idx", &["nope"]).is_err());
        assert!(table.indexes().is_empty());
    }

    #[test]
    fn apply_tag() {
        let mut mapper = Mapper::new(GenericDialect);
        let table = mapper.add_table::<Invoice>().unwrap();
        table
            .column_mut("memo")
            .unwrap()
            .apply_tag("note, size:50, default:'', notnull")
            .unwrap();
        let column = table.column("note").unwrap();
        assert_eq!(column.field_name(), "memo");
        assert_eq!(column.max_size(), Some(50));
        assert_eq!(column.default_value(), Some("''"));
        assert!(column.is_not_null());

        let error = table
            .column_mut("paid")
            .unwrap()
            .apply_tag("paid, primarykey")
            .expect_err("Keys go through set_keys");
        assert!(error.downcast_ref::<ConfigError>().is_some());
        assert!(
            table
                .column_mut("paid")
                .unwrap()
                .apply_tag("paid, size:big")
                .is_err()
        );
        table.column_mut("paid").unwrap().apply_tag("-").unwrap();
        assert!(table.column("paid").unwrap().is_transient());
    }
}
