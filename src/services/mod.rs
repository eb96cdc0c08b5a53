//! Business logic services.

pub mod analyzer;
pub mod dispatcher;
pub mod processor;
pub mod storage;

pub use analyzer::{
    AnalyzeRequest, AnalyzerError, AnalyzerResponse, HttpImageAnalyzer, ImageAnalyzer,
};
pub use dispatcher::Dispatcher;
pub use processor::{ImageProcessor, ProcessOutcome};
pub use storage::ImageStorage;
