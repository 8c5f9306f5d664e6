mod csv;
mod types;
mod validator;

pub use csv::CsvConnector;
pub use types::{RequiredColumn, DATE_COLUMN_ALIASES};
pub use validator::DataValidator;
