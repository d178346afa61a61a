pub mod normalize;
pub mod rows;
pub mod table;

pub use rows::{extract, ColumnAliases, RowWarning};
pub use table::{parse_first_table, RawTable};
