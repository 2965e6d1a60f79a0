use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio_util::sync::CancellationToken;
use transcript_pulse::{Resolution, ResolveTranscript};

/// Scripted resolver keyed by URL, recording every call. Can cancel a
/// token after a fixed number of resolutions to simulate an operator
/// interrupt mid-batch.
#[derive(Default)]
pub struct MockResolver {
    outcomes: HashMap<String, Resolution>,
    pub calls: Arc<Mutex<Vec<String>>>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl MockResolver {
    pub fn with_outcomes(outcomes: Vec<(&str, Resolution)>) -> Self {
        Self {
            outcomes: outcomes
                .into_iter()
                .map(|(url, resolution)| (url.to_string(), resolution))
                .collect(),
            ..Default::default()
        }
    }

    pub fn cancelling_after(mut self, calls: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }
}

impl ResolveTranscript for MockResolver {
    async fn resolve(&self, url: &str) -> Resolution {
        let call_count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(url.to_string());
            calls.len()
        };

        if let Some((after, token)) = &self.cancel_after {
            if call_count >= *after {
                token.cancel();
            }
        }

        self.outcomes
            .get(url)
            .cloned()
            .unwrap_or_else(|| Resolution::Failed(format!("unscripted url {url}")))
    }
}
