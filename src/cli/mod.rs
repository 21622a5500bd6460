//! Command-line interface: a thin consumer of the library's query surface

pub mod commands;

pub use commands::run;
