pub mod errors;
pub mod export;
pub mod metrics;
pub mod normalize;
mod progress;
pub mod recovery;
pub mod resolver;
pub mod sink;


pub use export::{ExportConfig, ExportReport, Exporter, MissingBlockPolicy};
pub use resolver::TxHashResolver;
pub use sink::{Sink, SinkBox};
