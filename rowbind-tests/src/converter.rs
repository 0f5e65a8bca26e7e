use rowbind::{
    CustomScanner, DbMap, Dialect, Executor, Mapper, Record, Result, SqlRunner, TypeConverter,
    Value, values,
};

/// Stores booleans as `Y` or `N` text.
pub struct YesNo;

impl TypeConverter for YesNo {
    fn to_storage(&self, value: Value) -> Result<Value> {
        Ok(match value {
            Value::Boolean(Some(v)) => Value::Varchar(Some(if v { "Y" } else { "N" }.into())),
            Value::Boolean(None) => Value::Varchar(None),
            v => v,
        })
    }

    fn from_storage(&self, sample: &Value) -> Option<CustomScanner> {
        match sample {
            Value::Boolean(..) => Some(CustomScanner::new(Value::Varchar(None), |value| {
                Ok(match value {
                    Value::Varchar(Some(v)) => Value::Boolean(Some(v == "Y")),
                    Value::Varchar(None) => Value::Boolean(None),
                    v => v,
                })
            })),
            _ => None,
        }
    }
}

#[derive(Record, Default, Debug, Clone, PartialEq)]
pub struct Task {
    #[db("id, primarykey, autoincrement")]
    pub id: i64,
    #[db("title, size:100")]
    pub title: String,
    pub done: bool,
    pub archived: Option<bool>,
}

pub async fn converter<E: Executor, D: Dialect + 'static>(executor: &mut E, dialect: D) {
    let mut mapper = Mapper::new(dialect).with_type_converter(YesNo);
    mapper
        .add_table_with_name::<Task>("task_test")
        .expect("Failed to register Task");
    {
        let table = mapper.table::<Task>().expect("Task is registered");
        let column = table.column("done").expect("Task has a done column");
        assert!(matches!(column.value(), Value::Boolean(..)));
        assert!(matches!(column.storage_value(), Value::Varchar(..)));
    }
    let mut db = DbMap::new(mapper, executor);

    // Setup
    db.drop_tables_if_exists()
        .await
        .expect("Failed to drop the task table");
    db.create_tables()
        .await
        .expect("Failed to create the task table");

    let mut task = Task {
        title: "write the docs".into(),
        done: true,
        archived: None,
        ..Default::default()
    };
    db.insert([&mut task])
        .await
        .expect("Failed to insert the task");

    // Stored through the converter
    let stored = db
        .select_str("select done from task_test", ())
        .await
        .expect("Failed to select the stored flag");
    assert_eq!(stored, "Y");
    let stored = db
        .select_null_str("select archived from task_test", ())
        .await
        .expect("Failed to select the stored flag");
    assert_eq!(stored, None);

    // Scanned back through the converter
    let loaded = db
        .get::<Task>(values![task.id])
        .await
        .expect("Failed to get the task")
        .expect("The task must exist");
    assert_eq!(loaded, task);

    task.done = false;
    task.archived = Some(true);
    db.update([&task]).await.expect("Failed to update the task");
    let rows = db
        .select::<Task>("select * from task_test", ())
        .await
        .expect("Failed to select the tasks")
        .strict()
        .expect("The mapping must be complete");
    assert_eq!(rows, [task.clone()]);
    let stored = db
        .select_str("select done || archived from task_test", ())
        .await
        .expect("Failed to select the stored flags");
    assert_eq!(stored, "NY");
}
