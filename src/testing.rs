//! Shared test doubles

use crate::error::FetchError;
use crate::remote::{FetchRequest, RemoteFetcher, RemotePage};
use crate::types::Item;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

type Scripted = Result<RemotePage, FetchError>;

/// Fetcher that replays scripted responses and records every request
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn then(self, response: Scripted) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    #[must_use]
    pub fn then_page(self, names: &[&str], partition: &str, after: Option<&str>) -> Self {
        self.then(Ok(page(names, partition, after)))
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl RemoteFetcher for ScriptedFetcher {
    async fn fetch_page(&self, request: &FetchRequest) -> Result<RemotePage, FetchError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::transport("no scripted response")))
    }
}

pub fn page(names: &[&str], partition: &str, after: Option<&str>) -> RemotePage {
    RemotePage::new(
        names.iter().map(|n| Item::new(*n, partition)).collect(),
        None,
        after.map(String::from),
    )
}
