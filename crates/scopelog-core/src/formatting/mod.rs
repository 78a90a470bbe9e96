//! Formatting pipeline: field extraction, line formatters and file export

mod export;
mod field;
mod formatters;

pub use export::export;
pub use field::{export_columns, extract, Field};
pub use formatters::{
    csv, json, tabs, CsvFormatter, JsonFormatter, LogFormatter, TabDelimitedFormatter,
    TIMESTAMP_FORMAT,
};
