pub mod output;
pub mod util;

pub use output::ReportSink;
pub use util::{parse_seeds, split_csv};
