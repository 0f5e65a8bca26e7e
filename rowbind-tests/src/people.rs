use rowbind::{
    DbMap, Dialect, Executor, FieldsNotFound, Mapper, MultipleRows, Record, SqlRunner, Value,
    is_no_rows, values,
};
use std::collections::BTreeMap;

#[derive(Record, Default, Debug, Clone, PartialEq)]
pub struct Audit {
    pub created: i64,
    pub updated: i64,
}

#[derive(Record, Default, Debug, Clone, PartialEq)]
pub struct Person {
    #[db("id, primarykey, autoincrement")]
    pub id: i64,
    #[record(embed)]
    pub audit: Audit,
    #[db("fname, size:64, notnull")]
    pub first_name: String,
    #[db("lname, size:64")]
    pub last_name: Option<String>,
    pub version: i32,
}

pub async fn people<E: Executor, D: Dialect + 'static>(executor: &mut E, dialect: D) {
    let mut mapper = Mapper::new(dialect);
    mapper
        .add_table_with_name::<Person>("person_test")
        .expect("Failed to register Person");
    let mut db = DbMap::new(mapper, executor);

    // Setup
    db.drop_tables_if_exists()
        .await
        .expect("Failed to drop the person table");
    db.create_tables()
        .await
        .expect("Failed to create the person table");

    let mut ada = Person {
        audit: Audit {
            created: 1000,
            updated: 1001,
        },
        first_name: "Ada".into(),
        last_name: Some("Lovelace".into()),
        version: 1,
        ..Default::default()
    };
    let mut alan = Person {
        audit: Audit {
            created: 2000,
            updated: 2000,
        },
        first_name: "Alan".into(),
        last_name: None,
        version: 3,
        ..Default::default()
    };
    db.insert([&mut ada, &mut alan])
        .await
        .expect("Failed to insert the people");

    // Embedded fields are persisted as columns of the outer table
    let loaded = db
        .get::<Person>(values![ada.id])
        .await
        .expect("Failed to get Ada")
        .expect("Ada must exist");
    assert_eq!(loaded, ada);
    let loaded = db
        .get::<Person>(values![alan.id])
        .await
        .expect("Failed to get Alan")
        .expect("Alan must exist");
    assert_eq!(loaded.last_name, None);
    assert_eq!(loaded.audit.created, 2000);

    // Partial mapping is reported but the rows are still populated
    let selection = db
        .select::<Person>("select ID, FNAME, 42 as bonus from person_test order by id", ())
        .await
        .expect("A partial mapping is not fatal");
    assert!(selection.is_partial());
    assert_eq!(selection.rows.len(), 2);
    assert_eq!(selection.rows[0].id, ada.id);
    assert_eq!(selection.rows[0].first_name, "Ada");
    assert_eq!(selection.rows[0].version, 0);
    let missing = selection.missing.clone().expect("The mapping is partial");
    assert_eq!(
        missing,
        FieldsNotFound {
            type_name: missing.type_name.clone(),
            missing_columns: vec!["bonus".into()],
            unmapped_fields: vec![
                "created".into(),
                "updated".into(),
                "last_name".into(),
                "version".into(),
            ],
        }
    );
    assert!(selection.strict().is_err());

    // Single row
    let id = BTreeMap::from([("id".to_string(), Value::from(alan.id))]);
    let mut holder = Person::default();
    let missing = db
        .select_one(
            &mut holder,
            "select * from person_test where id = :id",
            &id,
        )
        .await
        .expect("Failed to select Alan");
    assert!(missing.is_none());
    assert_eq!(holder, alan);

    let mut untouched = Person::default();
    let error = db
        .select_one(&mut untouched, "select * from person_test", ())
        .await
        .expect_err("Two rows must be rejected");
    assert!(error.downcast_ref::<MultipleRows>().is_some(), "{:#}", error);
    assert_eq!(untouched, Person::default());
    let error = db
        .select_one(
            &mut untouched,
            "select * from person_test where id < 0",
            (),
        )
        .await
        .expect_err("No rows must be rejected");
    assert!(is_no_rows(&error), "{:#}", error);
    assert_eq!(untouched, Person::default());

    let allocated = db
        .select_one_as::<Person>("select * from person_test where id = :id", &id)
        .await
        .expect("Failed to select Alan");
    assert_eq!(allocated, alan);

    // Scalars
    let count = db
        .select_int("select count(*) from person_test", ())
        .await
        .expect("Failed to count the people");
    assert_eq!(count, 2);
    let max = db
        .select_null_int("select max(version) from person_test where id < 0", ())
        .await
        .expect("Failed to select a null integer");
    assert_eq!(max, None);
    let max = db
        .select_int("select max(version) from person_test where id < 0", ())
        .await
        .expect("Failed to select a null integer");
    assert_eq!(max, 0);
    let average = db
        .select_float("select avg(version) from person_test", ())
        .await
        .expect("Failed to average the versions");
    assert_eq!(average, 2.0);
    let average = db
        .select_null_float("select avg(version) from person_test where id < 0", ())
        .await
        .expect("Failed to average no rows");
    assert_eq!(average, None);
    let name = db
        .select_str("select fname from person_test where id = :id", &id)
        .await
        .expect("Failed to select the first name");
    assert_eq!(name, "Alan");
    let name = db
        .select_null_str("select lname from person_test where id = :id", &id)
        .await
        .expect("Failed to select the last name");
    assert_eq!(name, None);
    let name = db
        .select_str("select fname from person_test where id < 0", ())
        .await
        .expect("Failed to select from no rows");
    assert_eq!(name, "");
    let count = db
        .select_str("select count(*) from person_test", ())
        .await
        .expect("Failed to read the count as text");
    assert_eq!(count, "2");
    let sum = db
        .select_float("select sum(version) from person_test", ())
        .await
        .expect("Failed to read an integer sum as float");
    assert_eq!(sum, 4.0);

    // Raw statements
    let affected = db
        .exec(
            "update person_test set version = version + 1 where id = :id",
            &id,
        )
        .await
        .expect("Failed to bump the version");
    assert_eq!(affected.rows_affected, 1);
    let rows = db
        .query("select fname, version from person_test order by id", ())
        .await
        .expect("Failed to query the people");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get_column("VERSION"), Some(&Value::Int64(Some(4))));
    assert_eq!(
        rows[0].get_column("fname"),
        Some(&Value::Varchar(Some("Ada".into())))
    );

    db.truncate_tables()
        .await
        .expect("Failed to truncate the person table");
    let count = db
        .select_int("select count(*) from person_test", ())
        .await
        .expect("Failed to count the people");
    assert_eq!(count, 0);
}
