//! Fire-and-forget scheduling of image processing.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::processor::ImageProcessor;

/// Hands image IDs to the processor on detached tokio tasks.
#[derive(Clone)]
pub struct Dispatcher {
    processor: Arc<ImageProcessor>,
}

impl Dispatcher {
    pub fn new(processor: ImageProcessor) -> Self {
        Self {
            processor: Arc::new(processor),
        }
    }

    /// Schedule processing of `image_id` and return immediately.
    ///
    /// No handle is kept and no result is reported back. Must be called
    /// from within a tokio runtime.
    pub fn enqueue(&self, image_id: i32) {
        info!(image_id, "Image queued for processing");

        let processor = Arc::clone(&self.processor);
        tokio::spawn(async move {
            let outcome = processor.process(image_id).await;
            if outcome.is_complete() {
                debug!(image_id, ?outcome, "Image processing finished");
            } else {
                warn!(image_id, ?outcome, "Image processing ended without an analysis");
            }
        });
    }
}
