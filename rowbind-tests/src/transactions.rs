use rowbind::{
    DbMap, Dialect, Executor, Mapper, Record, SqlRunner, TransactionFinished, values,
};

#[derive(Record, Default, Debug, Clone, PartialEq)]
pub struct Note {
    #[db("id, primarykey, autoincrement")]
    pub id: i64,
    #[db("body, size:255")]
    pub body: String,
}

pub async fn transactions<E: Executor, D: Dialect + 'static>(executor: &mut E, dialect: D) {
    let mut mapper = Mapper::new(dialect);
    mapper
        .add_table_with_name::<Note>("note_test")
        .expect("Failed to register Note");
    let mut db = DbMap::new(mapper, executor);

    // Setup
    db.drop_tables_if_exists()
        .await
        .expect("Failed to drop the note table");
    db.create_tables()
        .await
        .expect("Failed to create the note table");

    // Commit
    let mut kept = Note {
        body: "committed".into(),
        ..Default::default()
    };
    {
        let mut tx = db.begin().await.expect("Failed to begin the transaction");
        tx.insert([&mut kept])
            .await
            .expect("Failed to insert inside the transaction");
        tx.commit().await.expect("Failed to commit");
        assert!(tx.is_closed());

        let error = tx.commit().await.expect_err("A second commit must fail");
        assert!(error.downcast_ref::<TransactionFinished>().is_some());
        let error = tx.rollback().await.expect_err("Rollback after commit must fail");
        assert!(error.downcast_ref::<TransactionFinished>().is_some());
        let error = tx
            .select_int("select count(*) from note_test", ())
            .await
            .expect_err("A finished transaction cannot run statements");
        assert!(error.downcast_ref::<TransactionFinished>().is_some());
    }
    assert!(
        db.get::<Note>(values![kept.id])
            .await
            .expect("Failed to get the committed note")
            .is_some()
    );

    // Rollback
    let mut discarded = Note {
        body: "rolled back".into(),
        ..Default::default()
    };
    {
        let mut tx = db.begin().await.expect("Failed to begin the transaction");
        tx.insert([&mut discarded])
            .await
            .expect("Failed to insert inside the transaction");
        let count = tx
            .select_int("select count(*) from note_test", ())
            .await
            .expect("Failed to count inside the transaction");
        assert_eq!(count, 2);
        tx.rollback().await.expect("Failed to roll back");
        let error = tx.rollback().await.expect_err("A second rollback must fail");
        assert!(error.downcast_ref::<TransactionFinished>().is_some());
    }
    assert_eq!(
        db.get::<Note>(values![discarded.id])
            .await
            .expect("Failed to get the discarded note"),
        None
    );

    // Savepoints
    #[cfg(not(feature = "disable-savepoints"))]
    {
        let mut undone = Note {
            body: "undone".into(),
            ..Default::default()
        };
        let mut after = Note {
            body: "after the savepoint".into(),
            ..Default::default()
        };
        {
            let mut tx = db.begin().await.expect("Failed to begin the transaction");
            tx.savepoint("before_undone")
                .await
                .expect("Failed to create the savepoint");
            tx.insert([&mut undone])
                .await
                .expect("Failed to insert inside the savepoint");
            tx.rollback_to_savepoint("before_undone")
                .await
                .expect("Failed to roll back to the savepoint");
            tx.insert([&mut after])
                .await
                .expect("Failed to insert after the savepoint");
            tx.commit().await.expect("Failed to commit");
        }
        let bodies: Vec<String> = db
            .select_column("select body from note_test order by id", ())
            .await
            .expect("Failed to select the bodies");
        assert_eq!(bodies, ["committed", "after the savepoint"]);
    }
}
