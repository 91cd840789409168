pub mod error;
pub mod record;
pub mod types;
pub mod value;

pub use error::{Result, StoreError};
pub use record::{Record, RecordId};
pub use types::{Column, Row, TableSchema};
pub use value::{DataType, Value};
