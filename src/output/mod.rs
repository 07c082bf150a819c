mod summary;

pub use summary::{summary_path, write_summary};
