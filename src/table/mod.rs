mod input;
mod output;

pub use input::{select_text_column, InputTable};
pub use output::{output_header, OutputTable};
