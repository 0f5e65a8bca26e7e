#[cfg(test)]
mod tests {
    use rowbind::{
        Args, GenericDialect, PostgresDialect, Record, Value, expand_named_query, struct_to_args,
        values,
    };

    #[derive(Record, Default, Debug, Clone, PartialEq)]
    struct Filter {
        owner: i64,
        #[db("label_text")]
        label: String,
        archived: Option<bool>,
    }

    fn filter() -> Filter {
        Filter {
            owner: 4,
            label: "spring".into(),
            archived: None,
        }
    }

    #[test]
    fn record_arguments() {
        let filter = filter();
        let (sql, args) = expand_named_query(
            &GenericDialect,
            "SELECT * FROM items WHERE owner = :owner AND (label = :label OR :label = '')",
            Args::record(&filter),
        );
        assert_eq!(
            sql,
            "SELECT * FROM items WHERE owner = ? AND (label = ? OR ? = '')"
        );
        assert_eq!(
            args,
            [
                Value::Int64(Some(4)),
                Value::Varchar(Some("spring".into())),
                Value::Varchar(Some("spring".into())),
            ]
        );
    }

    #[test]
    fn record_arguments_postgres() {
        let filter = filter();
        let (sql, args) = expand_named_query(
            &PostgresDialect,
            "SELECT :owner::text, :archived, :missing FROM items WHERE created > '12:30'",
            Args::record(&filter),
        );
        assert_eq!(
            sql,
            "SELECT $1::text, $2, :missing FROM items WHERE created > '12:30'"
        );
        assert_eq!(args, [Value::Int64(Some(4)), Value::Boolean(None)]);
    }

    #[test]
    fn positional_untouched() {
        let positional = values![1, "two"];
        let (sql, args) = expand_named_query(
            &PostgresDialect,
            "SELECT :owner, $1, $2",
            Args::from(&positional),
        );
        assert_eq!(sql, "SELECT :owner, $1, $2");
        assert_eq!(args, positional);
    }

    #[test]
    fn question_mark_fields() {
        let filter = filter();
        let (sql, args) = struct_to_args(
            "UPDATE items SET label = ?label WHERE owner = ?owner AND id > ?",
            &filter,
        )
        .expect("Failed to expand the struct arguments");
        assert_eq!(sql, "UPDATE items SET label = ? WHERE owner = ? AND id > ?");
        assert_eq!(
            args,
            [Value::Varchar(Some("spring".into())), Value::Int64(Some(4))]
        );
        let error = struct_to_args("SELECT ?label_text", &filter)
            .expect_err("Columns names are not field names");
        assert!(error.to_string().contains("label_text"), "{}", error);
    }
}
