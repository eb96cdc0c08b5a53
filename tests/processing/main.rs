//! Image processing test suite.
//!
//! Runs the processor, dispatcher and upload endpoint against a SQLite
//! database and a mock analyzer server. No external services needed.
//!
//! Run with: cargo test --test processing

mod helpers;
mod mock_analyzer;

mod test_processor;
mod test_upload;
