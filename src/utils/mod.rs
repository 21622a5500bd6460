pub mod timestamps;

pub use timestamps::{format_file_timestamp, format_readable_date};
