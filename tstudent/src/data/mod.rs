mod loader;
mod table;

pub use loader::{load_from_bytes, load_table, DataFormat};
pub use table::{Cell, Column, Table, TablePreview};
