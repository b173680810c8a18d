//! # studentdb
//!
//! Statement builder and executor for a `students` table on PostgreSQL, intended as
//! test-support glue.
//!
//! - **Fixed templates**: insert/select/update/delete are rendered from four constant templates
//! - **Typed records**: inserts take a [`Student`], not a bag of attributes
//! - **Structural read detection**: every [`Statement`] carries a [`StatementKind`]; only
//!   `Select`/`Show` fetch rows
//! - **One connection**: [`StudentStore`] owns a single connection with an explicit `close`
//!
//! ```ignore
//! use studentdb::{StoreConfig, StudentStore, build_delete, build_select};
//!
//! let mut store = StudentStore::connect(StoreConfig::from_env()?).await?;
//!
//! let rows = store.execute(&build_select(Some("group_id=3"))?).await?;
//! for row in rows.rows().unwrap_or_default() {
//!     println!("{:?}", row.get("name"));
//! }
//!
//! store.execute(&build_delete("id=7")?).await?;
//! store.close().await?;
//! ```

pub mod condition;
pub mod config;
pub mod error;
pub mod response;
pub mod statement;
pub mod store;
pub mod student;

pub use condition::{Condition, UpdateSpec};
pub use config::StoreConfig;
pub use error::{DbError, DbResult};
pub use response::{ExecuteResult, RowMap};
pub use statement::{
    Statement, StatementKind, build_delete, build_insert, build_select, build_update,
    build_update_spec,
};
pub use store::StudentStore;
pub use student::Student;
