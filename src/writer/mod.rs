pub mod rows;
pub mod schema_gen;
pub mod sqlite;

pub use rows::*;
pub use schema_gen::*;
pub use sqlite::*;
