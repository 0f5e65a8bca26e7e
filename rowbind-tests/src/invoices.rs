use rowbind::{Args, DbMap, Dialect, Executor, Mapper, PlanKind, Record, SqlRunner, Value, values};
use std::collections::HashMap;

#[derive(Record, Default, Debug, Clone, PartialEq)]
pub struct Invoice {
    #[db("id, primarykey, autoincrement")]
    pub id: i64,
    pub created: i64,
    pub updated: i64,
    #[db("memo, size:200")]
    pub memo: String,
    pub person_id: i64,
    pub is_paid: bool,
    #[db("-")]
    pub cached_total: String,
}

pub async fn invoices<E: Executor, D: Dialect + 'static>(executor: &mut E, dialect: D) {
    let mut mapper = Mapper::new(dialect);
    mapper
        .add_table_with_name::<Invoice>("invoice_test")
        .expect("Failed to register Invoice");
    let mut db = DbMap::new(mapper, executor);

    // Setup
    db.drop_tables_if_exists()
        .await
        .expect("Failed to drop the invoice table");
    db.create_tables()
        .await
        .expect("Failed to create the invoice table");

    // Transient field never reaches the database
    {
        let mapper = db.mapper();
        let table = mapper.table::<Invoice>().expect("Invoice is registered");
        for kind in [PlanKind::Insert, PlanKind::Get, PlanKind::Update, PlanKind::Delete] {
            let plan = table.plan(kind, mapper.dialect());
            assert!(
                !plan.query.contains("cached_total"),
                "{:?} plan mentions a transient field: {}",
                kind,
                plan.query
            );
        }
    }

    // Empty table
    let no_one = HashMap::from([("person".to_string(), Value::from(99i64))]);
    let empty = db
        .select::<Invoice>(
            "select * from invoice_test where person_id = :person",
            &no_one,
        )
        .await
        .expect("Failed to select from an empty table");
    assert!(empty.rows.is_empty());
    assert!(empty.missing.is_none());
    assert_eq!(
        db.get::<Invoice>(values![1i64])
            .await
            .expect("Failed to get from an empty table"),
        None
    );

    // Insert
    let mut first = Invoice {
        created: 100,
        updated: 100,
        memo: "first order".into(),
        person_id: 1,
        is_paid: false,
        cached_total: "12.50".into(),
        ..Default::default()
    };
    let mut second = Invoice {
        created: 200,
        updated: 210,
        memo: "second order".into(),
        person_id: 2,
        is_paid: true,
        ..Default::default()
    };
    db.insert([&mut first, &mut second])
        .await
        .expect("Failed to insert the invoices");
    assert!(first.id > 0, "The generated id must be written back");
    assert!(second.id > first.id);

    // Get
    let loaded = db
        .get::<Invoice>(values![first.id])
        .await
        .expect("Failed to get the first invoice")
        .expect("The first invoice must exist");
    assert_eq!(
        loaded,
        Invoice {
            cached_total: String::new(),
            ..first.clone()
        }
    );

    // Update
    first.memo = "first order, paid".into();
    first.is_paid = true;
    first.updated = 150;
    let updated = db
        .update([&first])
        .await
        .expect("Failed to update the first invoice");
    assert_eq!(updated, 1);
    let loaded = db
        .get::<Invoice>(values![first.id])
        .await
        .expect("Failed to get the first invoice")
        .expect("The first invoice must exist");
    assert_eq!(loaded.memo, "first order, paid");
    assert!(loaded.is_paid);
    assert_eq!(loaded.updated, 150);

    // Select with named arguments from a map
    let person = HashMap::from([("person".to_string(), Value::from(2i64))]);
    let selection = db
        .select::<Invoice>(
            "select * from invoice_test where person_id = :person",
            &person,
        )
        .await
        .expect("Failed to select by person");
    assert!(selection.missing.is_none(), "{:?}", selection.missing);
    assert_eq!(selection.rows.len(), 1);
    assert_eq!(selection.rows[0].id, second.id);

    // Select with named arguments from a record
    let rows = db
        .select::<Invoice>(
            "select * from invoice_test where memo = :memo and person_id = :person_id",
            Args::record(&second),
        )
        .await
        .expect("Failed to select by memo")
        .strict()
        .expect("The mapping must be complete");
    assert_eq!(rows, [second.clone()]);

    // Appending to an existing vector
    let mut all = vec![first.clone()];
    let missing = db
        .select_into(&mut all, "select * from invoice_test order by id", ())
        .await
        .expect("Failed to select all invoices");
    assert!(missing.is_none());
    assert_eq!(all.len(), 3);
    assert_eq!(all[2].id, second.id);

    // Scalars and maps
    let ids: Vec<i64> = db
        .select_column("select id from invoice_test order by id", ())
        .await
        .expect("Failed to select the ids");
    assert_eq!(ids, [first.id, second.id]);
    assert!(
        db.select_column::<i64>("select id, memo from invoice_test", ())
            .await
            .is_err(),
        "A scalar select needs exactly one column"
    );
    let maps = db
        .select_maps("select id, memo from invoice_test order by id", ())
        .await
        .expect("Failed to select maps");
    assert_eq!(maps.len(), 2);
    assert_eq!(maps[0]["memo"], Value::Varchar(Some("first order, paid".into())));
    assert_eq!(maps[1]["id"], Value::Int64(Some(second.id)));

    // Delete
    let deleted = db
        .delete([&first, &second])
        .await
        .expect("Failed to delete the invoices");
    assert_eq!(deleted, 2);
    assert_eq!(
        db.get::<Invoice>(values![first.id])
            .await
            .expect("Failed to get a deleted invoice"),
        None
    );
    assert_eq!(
        db.delete([&first])
            .await
            .expect("Deleting a missing row is not an error"),
        0
    );
}
