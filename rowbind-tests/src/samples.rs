use rowbind::{DbMap, Dialect, Executor, Mapper, Record, SqlRunner, Value, values};
use rust_decimal::Decimal;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time,
    macros::{date, datetime, time},
};
use uuid::Uuid;

#[derive(Record, Default, Debug, Clone, PartialEq)]
pub struct Sample {
    #[db("id, primarykey")]
    pub id: Uuid,
    pub amount: Decimal,
    pub ratio: f32,
    pub day: Option<Date>,
    pub at: Option<Time>,
    pub stamp: Option<PrimitiveDateTime>,
    pub zoned: Option<OffsetDateTime>,
    pub payload: Vec<u8>,
    pub small: u8,
    pub big: u64,
    #[db("note, size:120")]
    pub note: Option<String>,
}

pub async fn samples<E: Executor, D: Dialect + 'static>(executor: &mut E, dialect: D) {
    let mut mapper = Mapper::new(dialect);
    mapper
        .add_table_with_name::<Sample>("sample_test")
        .expect("Failed to register Sample");
    let mut db = DbMap::new(mapper, executor);

    // Setup
    db.drop_tables_if_exists()
        .await
        .expect("Failed to drop the sample table");
    db.create_tables()
        .await
        .expect("Failed to create the sample table");

    let mut full = Sample {
        id: Uuid::new_v4(),
        amount: Decimal::new(12345, 3),
        ratio: 0.5,
        day: Some(date!(2024 - 02 - 29)),
        at: Some(time!(13:45:10.25)),
        stamp: Some(datetime!(2023 - 11 - 05 08:30:00)),
        zoned: Some(datetime!(2022 - 01 - 15 22:10:05 -3:30)),
        payload: vec![0, 1, 2, 0xfe, 0xff],
        small: 255,
        big: 9_000_000_000,
        note: Some("all the values".into()),
    };
    let mut empty = Sample {
        id: Uuid::new_v4(),
        ..Default::default()
    };
    db.insert([&mut full, &mut empty])
        .await
        .expect("Failed to insert the samples");

    let loaded = db
        .get::<Sample>(values![full.id])
        .await
        .expect("Failed to get the full sample")
        .expect("The full sample must exist");
    assert_eq!(loaded, full);
    let loaded = db
        .get::<Sample>(values![empty.id])
        .await
        .expect("Failed to get the empty sample")
        .expect("The empty sample must exist");
    assert_eq!(loaded, empty);
    assert_eq!(
        db.get::<Sample>(values![Uuid::nil()])
            .await
            .expect("Failed to get a missing sample"),
        None
    );

    // Positional arguments are bound as they are
    let mut sql = String::from("select note from sample_test where small = ");
    db.mapper().dialect().write_bind_var(&mut sql, 0);
    let notes: Vec<Option<String>> = db
        .select_column(&sql, &[Value::from(255u8)])
        .await
        .expect("Failed to select the notes");
    assert_eq!(notes, [Some("all the values".to_string())]);
}
