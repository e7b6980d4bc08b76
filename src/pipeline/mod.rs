pub mod extraction;
pub mod hypothesis;
pub mod processor;
pub mod reasoning;
pub mod redaction;
pub mod safety;
pub mod trend;


pub use processor::{AnalysisReport, PipelineError, Processor};
