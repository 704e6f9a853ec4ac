//! Raw tables and CSV I/O.

pub mod io;
pub mod table;

pub use io::{id_strings, read_csv, write_submission};
pub use table::{Column, RawTable};
