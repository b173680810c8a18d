//! Example walking through insert, select, update and delete on the students table
//!
//! Run with: cargo run --example crud -p studentdb
//!
//! Set STUDENTDB_* in .env file or environment variables:
//! STUDENTDB_USER=postgres
//! STUDENTDB_PASSWORD=postgres
//! STUDENTDB_DATABASE=studentdb_example

use studentdb::{
    DbError, StoreConfig, Student, StudentStore, build_delete, build_insert, build_select,
    build_update,
};

#[tokio::main]
async fn main() -> Result<(), DbError> {
    dotenvy::dotenv().ok();

    let mut config = StoreConfig::from_env()?;
    if config.database.is_none() {
        config = config.database("studentdb_example");
    }

    let mut store = StudentStore::connect(config).await?;
    println!("connected: {store:?}");

    // Setup: Create table
    store.execute_sql("DROP TABLE IF EXISTS students").await?;
    store
        .execute_sql(
            "CREATE TABLE students (
                id BIGINT PRIMARY KEY,
                name TEXT NOT NULL,
                login TEXT NOT NULL,
                password TEXT NOT NULL,
                group_id BIGINT NOT NULL
            )",
        )
        .await?;

    let students = [
        Student::new(1, "Ann", "ann", "pw1", 3),
        Student::new(2, "Bob", "bob", "pw2", 3),
        Student::new(3, "Cid", "cid", "pw3", 4),
    ];
    for s in &students {
        let stmt = build_insert(s);
        let ack = store.execute(&stmt).await?;
        println!("{stmt}  -> {:?} row(s)", ack.rows_affected());
    }

    let stmt = build_select(Some("group_id=3"))?;
    println!("\n{stmt}");
    for row in store.execute(&stmt).await?.rows().unwrap_or_default() {
        println!("  {row:?}");
    }

    let stmt = build_update("group_id=4", "id=2");
    let ack = store.execute(&stmt).await?;
    println!("\n{stmt}  -> {:?} row(s)", ack.rows_affected());

    let stmt = build_delete("id=1")?;
    let ack = store.execute(&stmt).await?;
    println!("{stmt}  -> {:?} row(s)", ack.rows_affected());

    let remaining = store.execute(&build_select(None)?).await?;
    println!("\nremaining: {}", remaining.rows().map_or(0, <[_]>::len));

    store.close().await
}
