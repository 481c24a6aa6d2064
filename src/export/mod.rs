pub mod error;
pub mod exporter;
pub mod records;
pub mod stable_json;
pub mod textview;

pub use records::{CorpusReport, GseSummary, GseSummaryReport, GsmCleanedRecord};
pub use stable_json::{pretty_dumps, stable_dumps};
pub use textview::{TextView, TextViewConfig, build_textview};
