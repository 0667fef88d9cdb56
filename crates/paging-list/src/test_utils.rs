// Copyright 2026 The paging-list Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Scripted data source and listener recorder shared by the list tests.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::{LoadedPage, PagedDataSource, PagingError, PagingLoadListener};

/// A message-like test item.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TestMessage {
    pub id: u64,
    pub body: String,
}

pub(crate) fn msg(id: u64) -> TestMessage {
    TestMessage { id, body: format!("message {id}") }
}

pub(crate) fn msgs(range: std::ops::Range<u64>) -> Vec<TestMessage> {
    range.map(msg).collect()
}

/// A paged source over an in-memory collection, with scripted overrides
/// and a gate for holding fetches in flight.
#[derive(Clone, Default)]
pub(crate) struct StubSource {
    backing: Arc<Mutex<Vec<TestMessage>>>,
    scripted: Arc<Mutex<VecDeque<Result<LoadedPage<TestMessage>, PagingError>>>>,
    calls: Arc<Mutex<Vec<(u64, usize)>>>,
    blocked_starts: Arc<Mutex<Vec<u64>>>,
    unblock: Arc<Notify>,
}

impl StubSource {
    /// A source backed by messages `0..count`.
    pub fn new(count: u64) -> Self {
        let source = Self::default();
        *source.backing.lock().unwrap() = msgs(0..count);
        source
    }

    /// Replace the backing collection.
    pub fn set_backing(&self, items: Vec<TestMessage>) {
        *self.backing.lock().unwrap() = items;
    }

    /// Serve `result` for the next fetch instead of reading the backing
    /// collection.
    pub fn script(&self, result: Result<LoadedPage<TestMessage>, PagingError>) {
        self.scripted.lock().unwrap().push_back(result);
    }

    /// Hold the next fetch starting at `start` at the gate until
    /// [`release`] is called. Held fetches are still recorded in [`calls`]
    /// on entry.
    ///
    /// [`release`]: Self::release
    /// [`calls`]: Self::calls
    pub fn block_start(&self, start: u64) {
        self.blocked_starts.lock().unwrap().push(start);
    }

    /// Unblock one held fetch.
    pub fn release(&self) {
        self.unblock.notify_one();
    }

    /// Every `(start, size)` fetch received so far.
    pub fn calls(&self) -> Vec<(u64, usize)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PagedDataSource for StubSource {
    type Item = TestMessage;

    async fn load_page(
        &self,
        start: u64,
        size: usize,
    ) -> Result<LoadedPage<TestMessage>, PagingError> {
        self.calls.lock().unwrap().push((start, size));

        let held = {
            let mut blocked = self.blocked_starts.lock().unwrap();
            match blocked.iter().position(|blocked_start| *blocked_start == start) {
                Some(position) => {
                    blocked.remove(position);
                    true
                }
                None => false,
            }
        };
        if held {
            self.unblock.notified().await;
        }

        if let Some(result) = self.scripted.lock().unwrap().pop_front() {
            return result;
        }

        let backing = self.backing.lock().unwrap();
        let start = start as usize;
        let items = if start < backing.len() {
            backing[start..(start + size).min(backing.len())].to_vec()
        } else {
            Vec::new()
        };
        Ok(LoadedPage { total: backing.len() as u64, items })
    }
}

/// Counts `on_success` calls and records `on_error` messages.
#[derive(Default)]
pub(crate) struct RecordingListener {
    successes: AtomicUsize,
    errors: Mutex<Vec<String>>,
}

impl RecordingListener {
    pub fn successes(&self) -> usize {
        self.successes.load(Ordering::SeqCst)
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl PagingLoadListener for RecordingListener {
    fn on_success(&self) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_error(&self, error: &PagingError) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}
