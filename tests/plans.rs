#[cfg(test)]
mod tests {
    use rowbind::{
        GenericDialect, Mapper, MySqlDialect, PlanKind, PostgresDialect, Record, Value,
    };
    use std::sync::Arc;

    #[derive(Record, Default, Debug, Clone, PartialEq)]
    struct Invoice {
        #[db("id, primarykey, autoincrement")]
        id: i64,
        created: i64,
        #[db("memo, size:200")]
        memo: String,
        #[db("-")]
        cache: String,
    }

    #[derive(Record, Default, Debug, Clone, PartialEq)]
    struct Membership {
        group_id: i32,
        user_id: i32,
        #[db("role, default:'member'")]
        role: String,
        joined: Option<i64>,
    }

    fn invoice_mapper(mut mapper: Mapper) -> Mapper {
        mapper
            .add_table_with_name::<Invoice>("invoice_test")
            .expect("Failed to register Invoice");
        mapper
    }

    #[test]
    fn generic_plans() {
        let mapper = invoice_mapper(Mapper::new(GenericDialect));
        let table = mapper.table::<Invoice>().unwrap();
        let dialect = mapper.dialect();

        let insert = table.plan(PlanKind::Insert, dialect);
        assert_eq!(
            insert.query,
            r#"INSERT INTO "invoice_test" ("created", "memo") VALUES (?, ?);"#
        );
        assert_eq!(insert.arg_fields, ["created", "memo"]);
        assert_eq!(insert.auto_incr_idx, Some(0));
        assert_eq!(insert.auto_incr_field_name, Some("id"));

        let get = table.plan(PlanKind::Get, dialect);
        assert_eq!(
            get.query,
            r#"SELECT "id", "created", "memo" FROM "invoice_test" WHERE "id" = ?;"#
        );
        assert_eq!(get.key_fields, ["id"]);

        let update = table.plan(PlanKind::Update, dialect);
        assert_eq!(
            update.query,
            r#"UPDATE "invoice_test" SET "created" = ?, "memo" = ? WHERE "id" = ?;"#
        );
        assert_eq!(update.arg_fields, ["created", "memo", "id"]);
        assert_eq!(update.set_count(), 2);

        let delete = table.plan(PlanKind::Delete, dialect);
        assert_eq!(delete.query, r#"DELETE FROM "invoice_test" WHERE "id" = ?;"#);
        assert_eq!(delete.arg_fields, ["id"]);
    }

    #[test]
    fn postgres_plans() {
        let mapper = invoice_mapper(Mapper::new(PostgresDialect));
        let table = mapper.table::<Invoice>().unwrap();
        let dialect = mapper.dialect();
        assert_eq!(
            table.plan(PlanKind::Insert, dialect).query,
            r#"INSERT INTO "invoice_test" ("id", "created", "memo") VALUES (DEFAULT, $1, $2) RETURNING "id";"#
        );
        assert_eq!(
            table.plan(PlanKind::Update, dialect).query,
            r#"UPDATE "invoice_test" SET "created" = $1, "memo" = $2 WHERE "id" = $3;"#
        );
        assert_eq!(
            table.plan(PlanKind::Get, dialect).query,
            r#"SELECT "id", "created", "memo" FROM "invoice_test" WHERE "id" = $1;"#
        );
    }

    #[test]
    fn mysql_plans() {
        let mapper = invoice_mapper(Mapper::new(MySqlDialect::default()));
        let table = mapper.table::<Invoice>().unwrap();
        let dialect = mapper.dialect();
        assert_eq!(
            table.plan(PlanKind::Insert, dialect).query,
            "INSERT INTO `invoice_test` (`id`, `created`, `memo`) VALUES (NULL, ?, ?);"
        );
        assert_eq!(
            table.plan(PlanKind::Delete, dialect).query,
            "DELETE FROM `invoice_test` WHERE `id` = ?;"
        );
    }

    #[test]
    fn composite_keys_and_defaults() {
        let mut mapper = Mapper::new(PostgresDialect);
        mapper
            .add_table_with_name_and_schema::<Membership>("auth", "membership")
            .unwrap()
            .set_keys(false, &["group_id", "user_id"])
            .unwrap();
        let table = mapper.table::<Membership>().unwrap();
        let dialect = mapper.dialect();
        let insert = table.plan(PlanKind::Insert, dialect);
        assert_eq!(
            insert.query,
            r#"INSERT INTO "auth"."membership" ("group_id", "user_id", "role", "joined") VALUES ($1, $2, 'member', $3);"#
        );
        assert_eq!(insert.auto_incr_idx, None);
        assert_eq!(
            table.plan(PlanKind::Update, dialect).query,
            r#"UPDATE "auth"."membership" SET "group_id" = $1, "user_id" = $2, "role" = $3, "joined" = $4 WHERE "group_id" = $5 AND "user_id" = $6;"#
        );
        assert_eq!(
            table.plan(PlanKind::Delete, dialect).query,
            r#"DELETE FROM "auth"."membership" WHERE "group_id" = $1 AND "user_id" = $2;"#
        );
    }

    #[test]
    fn plans_are_compiled_once() {
        let mut mapper = invoice_mapper(Mapper::new(GenericDialect));
        {
            let table = mapper.table::<Invoice>().unwrap();
            let first = table.plan(PlanKind::Get, mapper.dialect());
            let second = table.plan(PlanKind::Get, mapper.dialect());
            assert!(Arc::ptr_eq(&first, &second));
        }
        let before = mapper
            .table::<Invoice>()
            .unwrap()
            .plan(PlanKind::Get, mapper.dialect());
        mapper
            .table_mut::<Invoice>()
            .unwrap()
            .set_name("renamed_invoice");
        let table = mapper.table::<Invoice>().unwrap();
        let after = table.plan(PlanKind::Get, mapper.dialect());
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(before.query.contains(r#""invoice_test""#));
        assert!(after.query.contains(r#""renamed_invoice""#));
    }

    #[test]
    fn bind_instance() {
        let mapper = invoice_mapper(Mapper::new(GenericDialect));
        let table = mapper.table::<Invoice>().unwrap();
        let invoice = Invoice {
            id: 7,
            created: 3,
            memo: "paper".into(),
            cache: "ignored".into(),
        };
        let instance = table
            .plan(PlanKind::Update, mapper.dialect())
            .create_bind_instance(&invoice, None)
            .expect("Failed to bind the invoice");
        assert_eq!(
            instance.args,
            [
                Value::Int64(Some(3)),
                Value::Varchar(Some("paper".into())),
                Value::Int64(Some(7)),
            ]
        );
        assert_eq!(instance.keys, [Value::Int64(Some(7))]);
        let query = instance.into_query();
        assert_eq!(query.args.len(), 3);
    }
}
