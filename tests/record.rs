#[cfg(test)]
mod tests {
    use rowbind::{FieldKind, Record, Value, flatten_fields};
    use rust_decimal::Decimal;
    use time::{Date, macros::date};

    #[derive(Record, Default, Debug, Clone, PartialEq)]
    struct Audit {
        created: i64,
        #[db("audit_note")]
        note: Option<String>,
    }

    #[derive(Record, Default, Debug, Clone, PartialEq)]
    struct Account {
        #[db("id, primarykey, autoincrement")]
        id: u64,
        #[record(embed)]
        audit: Audit,
        #[db("note, size:30, default:'none'")]
        note: String,
        #[db("-")]
        scratch: Vec<u8>,
        balance: Decimal,
        opened: Option<Date>,
    }

    #[test]
    fn field_definitions() {
        let fields = Account::fields();
        assert_eq!(fields.len(), 6);

        assert_eq!(fields[0].name, "id");
        assert!(matches!(fields[0].value, Value::UInt64(None)));
        assert!(fields[0].primary_key);
        assert!(fields[0].auto_increment);
        assert!(!fields[0].nullable);

        assert_eq!(fields[1].name, "audit");
        assert!(matches!(fields[1].kind, FieldKind::Embedded(..)));

        assert_eq!(fields[2].column_name(), "note");
        assert_eq!(fields[2].size, Some(30));
        assert_eq!(fields[2].default, Some("'none'"));

        assert!(fields[3].transient);
        assert!(matches!(fields[4].value, Value::Decimal(None)));
        assert!(matches!(fields[5].value, Value::Date(None)));
        assert!(fields[5].nullable);

        let audit = Audit::fields();
        assert_eq!(audit[1].column_name(), "audit_note");
        assert!(audit[1].nullable);
    }

    #[test]
    fn flattened_fields() {
        let names = flatten_fields(Account::fields())
            .into_iter()
            .map(|f| f.name)
            .collect::<Vec<_>>();
        // The outer `note` shadows the embedded one
        assert_eq!(names, ["id", "created", "note", "scratch", "balance", "opened"]);
        let note = flatten_fields(Account::fields())
            .into_iter()
            .find(|f| f.name == "note")
            .unwrap();
        assert_eq!(note.column_name(), "note");
    }

    #[test]
    fn get_fields() {
        let account = Account {
            id: 12,
            audit: Audit {
                created: 1700,
                note: Some("inner".into()),
            },
            note: "outer".into(),
            scratch: vec![1, 2, 3],
            balance: Decimal::new(-2550, 2),
            opened: Some(date!(2021 - 06 - 30)),
        };
        assert_eq!(account.get_field("id"), Some(Value::UInt64(Some(12))));
        assert_eq!(account.get_field("created"), Some(Value::Int64(Some(1700))));
        assert_eq!(
            account.get_field("note"),
            Some(Value::Varchar(Some("outer".into())))
        );
        assert_eq!(
            account.get_field("balance"),
            Some(Value::Decimal(Some(Decimal::new(-2550, 2))))
        );
        assert_eq!(
            account.get_field("opened"),
            Some(Value::Date(Some(date!(2021 - 06 - 30))))
        );
        assert_eq!(account.get_field("scratch"), None);
        assert_eq!(account.get_field("audit"), None);
        assert_eq!(account.get_field("unknown"), None);

        let empty = Audit::default();
        assert_eq!(empty.get_field("note"), Some(Value::Varchar(None)));
    }

    #[test]
    fn set_fields() {
        let mut account = Account::default();
        assert!(account.set_field("id", Value::Int64(Some(5))).unwrap());
        assert!(
            account
                .set_field("created", Value::Int64(Some(99)))
                .unwrap()
        );
        assert!(
            account
                .set_field("note", Value::Varchar(Some("outer".into())))
                .unwrap()
        );
        assert!(
            account
                .set_field("balance", Value::Varchar(Some("10.25".into())))
                .unwrap()
        );
        assert!(
            account
                .set_field("opened", Value::Varchar(Some("2020-01-02".into())))
                .unwrap()
        );
        assert!(!account.set_field("scratch", Value::Null).unwrap());
        assert!(!account.set_field("unknown", Value::Null).unwrap());
        assert_eq!(
            account,
            Account {
                id: 5,
                audit: Audit {
                    created: 99,
                    note: None,
                },
                note: "outer".into(),
                scratch: vec![],
                balance: Decimal::new(1025, 2),
                opened: Some(date!(2020 - 01 - 02)),
            }
        );

        assert!(account.set_field("id", Value::Int64(Some(-1))).is_err());
        assert!(
            account
                .set_field("created", Value::Varchar(Some("soon".into())))
                .is_err()
        );
        assert!(account.set_field("opened", Value::Null).unwrap());
        assert_eq!(account.opened, None);
    }

    #[test]
    fn dynamic_records() {
        let mut account = Account::default();
        let record: &mut dyn Record = account.as_dyn_mut();
        assert!(record.type_name().ends_with("Account"));
        assert_eq!(record.field_defs().len(), 6);
        record.set_field("id", Value::UInt64(Some(3))).unwrap();
        assert_eq!(account.id, 3);
        assert_eq!(account.as_dyn().get_field("id"), Some(Value::UInt64(Some(3))));
    }
}
