use video_datastore::VideoStore;

use crate::{processor::BatchProcessor, resolver::ResolveTranscript};

/// Assembles a [`BatchProcessor`] step by step; `build` only exists
/// once both the datastore and the resolver have been provided.
pub struct BatchProcessorBuilder<D = (), R = ()> {
    datastore: D,
    resolver: R,
    show_progress: bool,
}

impl BatchProcessorBuilder {
    pub fn new() -> Self {
        BatchProcessorBuilder {
            datastore: (),
            resolver: (),
            show_progress: true,
        }
    }
}

impl Default for BatchProcessorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, R> BatchProcessorBuilder<D, R> {
    pub fn datastore<D2>(self, datastore: D2) -> BatchProcessorBuilder<D2, R>
    where
        D2: VideoStore + Send + Sync,
    {
        BatchProcessorBuilder {
            datastore,
            resolver: self.resolver,
            show_progress: self.show_progress,
        }
    }

    pub fn resolver<R2>(self, resolver: R2) -> BatchProcessorBuilder<D, R2>
    where
        R2: ResolveTranscript + Send + Sync,
    {
        BatchProcessorBuilder {
            datastore: self.datastore,
            resolver,
            show_progress: self.show_progress,
        }
    }

    pub fn show_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

impl<D, R> BatchProcessorBuilder<D, R>
where
    D: VideoStore + Send + Sync,
    R: ResolveTranscript + Send + Sync,
{
    pub fn build(self) -> BatchProcessor<D, R> {
        BatchProcessor {
            datastore: self.datastore,
            resolver: self.resolver,
            show_progress: self.show_progress,
        }
    }
}
