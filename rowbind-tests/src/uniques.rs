use crate::silent_logs;
use rowbind::{ConfigError, DbMap, Dialect, Executor, Mapper, Record, SqlRunner};

#[derive(Record, Default, Debug, Clone, PartialEq)]
pub struct Slug {
    #[db("id, primarykey")]
    pub id: i64,
    #[db("owner, size:32, notnull")]
    pub owner: String,
    #[db("slug, size:64, notnull")]
    pub slug: String,
}

pub async fn uniques<E: Executor, D: Dialect + 'static>(executor: &mut E, dialect: D) {
    let mut mapper = Mapper::new(dialect);
    let table = mapper
        .add_table_with_name::<Slug>("slug_test")
        .expect("Failed to register Slug");
    table
        .set_unique_together(&["owner", "slug"])
        .expect("Failed to declare the unique group");
    let error = table
        .set_unique_together(&["slug", "owner"])
        .expect_err("The same group cannot be declared twice");
    assert!(error.downcast_ref::<ConfigError>().is_some());
    let error = table
        .set_unique_together(&["owner"])
        .expect_err("A unique group needs two columns");
    assert!(error.downcast_ref::<ConfigError>().is_some());
    table
        .add_index("slug_test_owner_idx", &["owner"])
        .expect("Failed to declare the index");
    let mut db = DbMap::new(mapper, executor);

    // Setup
    db.drop_tables_if_exists()
        .await
        .expect("Failed to drop the slug table");
    db.create_tables()
        .await
        .expect("Failed to create the slug table");
    db.create_index()
        .await
        .expect("Failed to create the owner index");

    // The batch stops at the first failing record
    let mut first = Slug {
        id: 1,
        owner: "ann".into(),
        slug: "home".into(),
    };
    let mut clash = Slug {
        id: 2,
        owner: "ann".into(),
        slug: "home".into(),
    };
    let mut last = Slug {
        id: 3,
        owner: "bob".into(),
        slug: "home".into(),
    };
    silent_logs! {
        assert!(
            db.insert([&mut first, &mut clash, &mut last]).await.is_err(),
            "The unique group must reject the second slug"
        );
    }
    let count = db
        .select_int("select count(*) from slug_test", ())
        .await
        .expect("Failed to count the slugs");
    assert_eq!(count, 1);

    // Same slug for another owner is fine
    db.insert([&mut last])
        .await
        .expect("Failed to insert the slug of another owner");
    let owners: Vec<String> = db
        .select_column("select owner from slug_test order by id", ())
        .await
        .expect("Failed to select the owners");
    assert_eq!(owners, ["ann", "bob"]);

    db.drop_index::<Slug>("slug_test_owner_idx")
        .await
        .expect("Failed to drop the owner index");
    let error = db
        .drop_index::<Slug>("unknown_idx")
        .await
        .expect_err("Unknown indexes cannot be dropped");
    assert!(error.downcast_ref::<ConfigError>().is_some());
    db.drop_tables().await.expect("Failed to drop the slug table");
}
