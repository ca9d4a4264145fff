pub mod align;
pub mod field;
pub mod generator;
pub mod key;

use thiserror::Error;

use self::key::GridKey;

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("field `{field}` has {keys} keys but {values} values")]
    LengthMismatch {
        field: String,
        keys: usize,
        values: usize,
    },
    #[error("field `{field}` contains key {key} more than once")]
    DuplicateKey { field: String, key: GridKey },
    #[error("table has no column `{0}`")]
    MissingColumn(String),
    #[error("column `{0}` appears in more than one joined field")]
    DuplicateColumn(String),
}
