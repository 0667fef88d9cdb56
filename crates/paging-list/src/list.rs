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

//! The paging list is a stateful object that materializes a bounded window
//! of a paged remote collection, loads more of it as the visible position
//! approaches a window edge, and splices in changes pushed by a real-time
//! event stream.

use std::{
    fmt,
    sync::{Arc, Mutex},
};

use eyeball::{SharedObservable, Subscriber};
use eyeball_im::VectorDiff;
use futures_core::Stream;
use imbl::Vector;
use tokio::spawn;
use tracing::{debug, instrument, trace, warn};

use crate::{
    config::PagingConfig,
    error::PagingError,
    source::PagedDataSource,
    state::{IdentityFn, LoadState, WindowState},
};

/// Observer notified after every settled load.
///
/// This is the push channel toward the UI beyond the observable window and
/// load states themselves. Callbacks run synchronously on the completing
/// load's task and must not block; discarded stale results notify nobody.
pub trait PagingLoadListener: Send + Sync {
    /// A load completed and its result has been merged into the window.
    fn on_success(&self);

    /// A load failed; the window was left untouched.
    fn on_error(&self, error: &PagingError);
}

/// Builder for a [`PagingList`].
pub struct PagingListBuilder<T> {
    source: Box<dyn PagedDataSource<Item = T>>,
    config: PagingConfig,
    identity: Option<IdentityFn<T>>,
    listener: Option<Arc<dyn PagingLoadListener>>,
}

impl<T: Clone + Send + Sync + 'static> PagingListBuilder<T> {
    fn new(source: Box<dyn PagedDataSource<Item = T>>) -> Self {
        Self { source, config: PagingConfig::default(), identity: None, listener: None }
    }

    /// Use the given configuration instead of [`PagingConfig::default`].
    pub fn config(mut self, config: PagingConfig) -> Self {
        self.config = config;
        self
    }

    /// Supply a stable identity key per item, enabling de-duplication at
    /// window boundaries when a load result overlaps items already
    /// present.
    pub fn identity<K, F>(mut self, id: F) -> Self
    where
        K: PartialEq,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.identity = Some(Arc::new(move |a, b| id(a) == id(b)));
        self
    }

    /// Register the load listener up front.
    pub fn load_listener(mut self, listener: Arc<dyn PagingLoadListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Build the list.
    ///
    /// The list starts with an empty window; issue a
    /// [`PagingList::refresh`] to populate it.
    pub fn build(self) -> PagingList<T> {
        PagingList {
            inner: Arc::new(PagingListInner {
                source: self.source,
                config: self.config,
                identity: self.identity,
                state: Mutex::new(WindowState::new(self.config)),
                refresh_state: SharedObservable::new(LoadState::NotLoading),
                prepend_state: SharedObservable::new(LoadState::NotLoading),
                append_state: SharedObservable::new(LoadState::NotLoading),
                listener: Mutex::new(self.listener),
            }),
        }
    }
}

/// A windowed, bidirectionally loading view over a [`PagedDataSource`].
///
/// Cheap to clone; spawned prefetch tasks hold a clone of the list they
/// load into. All async methods must be called from within a Tokio
/// runtime.
///
/// See also the module-level documentation.
pub struct PagingList<T: Clone + Send + Sync + 'static> {
    inner: Arc<PagingListInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> Clone for PagingList<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

struct PagingListInner<T: Clone + Send + Sync + 'static> {
    /// The paged collection the window materializes.
    source: Box<dyn PagedDataSource<Item = T>>,

    config: PagingConfig,

    /// Item equivalence under the caller-supplied identity key, for
    /// boundary de-duplication.
    identity: Option<IdentityFn<T>>,

    /// Window, paging keys, generation and in-flight flags, mutated as one
    /// atomic unit. Never held across an await.
    state: Mutex<WindowState<T>>,

    /// UI-facing mirrors of the per-direction loading state.
    refresh_state: SharedObservable<LoadState>,
    prepend_state: SharedObservable<LoadState>,
    append_state: SharedObservable<LoadState>,

    listener: Mutex<Option<Arc<dyn PagingLoadListener>>>,
}

impl<T: Clone + Send + Sync + 'static> fmt::Debug for PagingList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Don't include the source nor the items in the debug output.
        let state = self.inner.state.lock().unwrap();
        f.debug_struct("PagingList")
            .field("len", &state.len())
            .field("previous_page_key", &state.previous_page_key)
            .field("next_page_key", &state.next_page_key)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> PagingList<T> {
    /// Create a list over the given source with the default configuration.
    pub fn new(source: Box<dyn PagedDataSource<Item = T>>) -> Self {
        Self::builder(source).build()
    }

    /// Create a [`PagingListBuilder`] over the given source.
    pub fn builder(source: Box<dyn PagedDataSource<Item = T>>) -> PagingListBuilder<T> {
        PagingListBuilder::new(source)
    }

    // --- Load orchestration ---

    /// Reload the window from the start of the collection.
    ///
    /// See [`refresh_from`](Self::refresh_from).
    pub async fn refresh(&self) -> bool {
        self.refresh_from(0).await
    }

    /// Throw the whole window away and reload it from `start_key`.
    ///
    /// Returns `false` without doing anything if a refresh is already in
    /// flight. Returns `true` as soon as a load was issued, even if that
    /// load subsequently fails: failures surface through the refresh
    /// [`LoadState`] and the load listener, like any other load. A refresh
    /// supersedes every previously issued load; their results are
    /// discarded on completion.
    #[instrument(skip(self))]
    pub async fn refresh_from(&self, start_key: u64) -> bool {
        let (generation, next_key_at_start) = {
            let mut state = self.inner.state.lock().unwrap();
            if state.refresh_in_flight {
                trace!("a refresh is already in flight");
                return false;
            }
            state.refresh_in_flight = true;
            // Published inside the critical section, so the mirror can
            // never contradict the in-flight flag.
            self.inner.refresh_state.set(LoadState::Loading);
            state.begin_refresh(start_key as i64)
        };

        let requested = self.inner.config.initial_page_size;
        match self.inner.source.load_page(start_key, requested).await {
            Ok(page) => {
                let applied = {
                    let mut state = self.inner.state.lock().unwrap();
                    state.refresh_in_flight = false;
                    self.inner.refresh_state.set(LoadState::NotLoading);
                    if state.generation == generation {
                        state.apply_refresh(start_key as i64, next_key_at_start, requested, page);
                        true
                    } else {
                        false
                    }
                };
                if applied {
                    debug!("refresh merged");
                    self.notify_success();
                } else {
                    trace!("discarding superseded refresh result");
                }
            }
            Err(error) => {
                let error = Arc::new(error);
                {
                    let mut state = self.inner.state.lock().unwrap();
                    state.refresh_in_flight = false;
                    self.inner.refresh_state.set(LoadState::Error(error.clone()));
                }
                self.notify_error(&error);
            }
        }

        true
    }

    /// Load the next page at the forward edge of the window.
    ///
    /// No-op when the forward edge is exhausted or a forward load is
    /// already in flight; "already loading" is a busy signal, not an
    /// error.
    #[instrument(skip(self))]
    pub async fn load_next_page(&self) {
        let (start, generation) = {
            let mut state = self.inner.state.lock().unwrap();
            if state.next_page_key.end_reached || state.append_in_flight {
                return;
            }
            state.append_in_flight = true;
            self.inner.append_state.set(LoadState::Loading);
            (state.next_page_key.key, state.generation)
        };

        let result =
            self.inner.source.load_page(start.max(0) as u64, self.inner.config.page_size).await;

        match result {
            Ok(page) => {
                let appended = {
                    let mut state = self.inner.state.lock().unwrap();
                    state.append_in_flight = false;
                    self.inner.append_state.set(LoadState::NotLoading);
                    (state.generation == generation)
                        .then(|| state.apply_append(start, page, self.inner.identity.as_ref()))
                };
                match appended {
                    Some(appended) => {
                        trace!(appended, "forward page merged");
                        self.notify_success();
                    }
                    None => trace!("discarding superseded forward page"),
                }
            }
            Err(error) => self.settle_load_error(Direction::Append, generation, error),
        }
    }

    /// Load the previous page at the backward edge of the window.
    ///
    /// Mirror of [`load_next_page`](Self::load_next_page). Near the start
    /// of the collection the request is clamped so the source is never
    /// asked for a negative index.
    #[instrument(skip(self))]
    pub async fn load_previous_page(&self) {
        let (start, size, key_at_start, generation) = {
            let mut state = self.inner.state.lock().unwrap();
            if state.previous_page_key.end_reached || state.prepend_in_flight {
                return;
            }

            let mut start = state.previous_page_key.key;
            let mut size = self.inner.config.page_size as i64;
            if start < 0 {
                size += start;
                start = 0;
            }
            if size <= 0 {
                // Nothing left below the window; only reachable when the
                // keys were shifted underneath us.
                state.previous_page_key.end_reached = true;
                return;
            }

            state.prepend_in_flight = true;
            self.inner.prepend_state.set(LoadState::Loading);
            (start, size as usize, state.previous_page_key.key, state.generation)
        };

        match self.inner.source.load_page(start as u64, size).await {
            Ok(page) => {
                let prepended = {
                    let mut state = self.inner.state.lock().unwrap();
                    state.prepend_in_flight = false;
                    // A backward key that moved while we were fetching
                    // means the window's front no longer is where this
                    // page belongs; drop the result entirely.
                    let stale = state.generation != generation
                        || state.previous_page_key.key != key_at_start;
                    self.inner.prepend_state.set(LoadState::NotLoading);
                    (!stale)
                        .then(|| state.apply_prepend(start, page, self.inner.identity.as_ref()))
                };
                match prepended {
                    Some(prepended) => {
                        trace!(prepended, "backward page merged");
                        self.notify_success();
                    }
                    None => trace!("discarding superseded backward page"),
                }
            }
            Err(error) => self.settle_load_error(Direction::Prepend, generation, error),
        }
    }

    /// Bring `key` into the window.
    ///
    /// Returns `false` when the key is already covered (nothing to do),
    /// `true` when a refresh targeting it was issued; awaiting the call
    /// observes that refresh's completion.
    pub async fn go_to(&self, key: u64) -> bool {
        if self.inner.state.lock().unwrap().has_key(key) {
            return false;
        }
        self.refresh_from(key).await;
        true
    }

    // --- Out-of-band splices ---

    /// Append items pushed by the external event stream.
    ///
    /// Fails with [`PagingError::ForwardEdgeOpen`] unless the forward edge
    /// is exhausted — only then is a hand-made append index-consistent
    /// with the upstream collection.
    pub fn append(&self, items: Vec<T>) -> Result<(), PagingError> {
        self.inner.state.lock().unwrap().splice_back(items)
    }

    /// Prepend items pushed by the external event stream.
    ///
    /// Fails with [`PagingError::BackwardEdgeOpen`] unless the backward
    /// edge is exhausted. While any load is in flight the window cannot be
    /// touched at all: the call fails with [`PagingError::LoadInFlight`],
    /// but with `increase` it shifts both paging keys by the inserted
    /// count first, keeping the in-flight load's merge consistent with the
    /// shifted index space. Retry the prepend once the load settles.
    pub fn prepend(&self, items: Vec<T>, increase: bool) -> Result<(), PagingError> {
        self.inner.state.lock().unwrap().splice_front(items, increase)
    }

    /// Replace the item at `index`, returning the previous item.
    pub fn replace(&self, index: usize, item: T) -> Result<T, PagingError> {
        self.inner.state.lock().unwrap().replace(index, item)
    }

    /// Replace every window item with the result of `op` applied to it.
    pub fn replace_all<F: FnMut(&T) -> T>(&self, op: F) {
        self.inner.state.lock().unwrap().replace_all(op);
    }

    /// Remove every item matching the predicate, keeping the window
    /// gap-free. Returns the number of removed items.
    pub fn remove_if<F: FnMut(&T) -> bool>(&self, predicate: F) -> usize {
        self.inner.state.lock().unwrap().remove_if(predicate)
    }

    // --- Read access ---

    /// The item at `index` in the current window.
    ///
    /// Pure access: reporting the visible position and triggering
    /// prefetches is the separate [`report_visible`](Self::report_visible)
    /// call.
    pub fn item_at(&self, index: usize) -> Option<T> {
        self.inner.state.lock().unwrap().item_at(index)
    }

    /// Record that the UI currently displays `index`, prefetching the
    /// neighboring pages when the index comes close to a window edge.
    ///
    /// Prefetch loads run on spawned tasks and are idempotent no-ops when
    /// their direction is already loading or exhausted. Out-of-range
    /// indices are ignored.
    pub fn report_visible(&self, index: usize) {
        let (near_front, near_back) = {
            let mut state = self.inner.state.lock().unwrap();
            let len = state.len();
            if index >= len {
                return;
            }
            state.current_key = state.first_key() + index as i64;

            let reach = self.inner.config.prefetch_reach();
            (index <= reach, index + reach + 1 >= len)
        };

        if near_back {
            let list = self.clone();
            spawn(async move { list.load_next_page().await });
        }
        if near_front {
            let list = self.clone();
            spawn(async move { list.load_previous_page().await });
        }
    }

    /// Number of items currently materialized.
    pub fn len(&self) -> usize {
        self.inner.state.lock().unwrap().len()
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A snapshot of the current window items.
    pub fn items(&self) -> Vector<T> {
        self.inner.state.lock().unwrap().snapshot()
    }

    /// The current window items plus a stream of updates applied to them.
    pub fn subscribe(&self) -> (Vector<T>, impl Stream<Item = VectorDiff<T>> + Unpin) {
        self.inner.state.lock().unwrap().subscribe().into_values_and_stream()
    }

    /// Virtual index of the window's first element.
    pub fn first_key(&self) -> u64 {
        self.inner.state.lock().unwrap().first_key().max(0) as u64
    }

    /// Virtual index of the item at `index`.
    pub fn item_key(&self, index: usize) -> u64 {
        self.inner.state.lock().unwrap().item_key(index)
    }

    /// Whether `key` falls within the window's covered key range.
    pub fn has_key(&self, key: u64) -> bool {
        self.inner.state.lock().unwrap().has_key(key)
    }

    /// Window index of the item with virtual index `key`, if materialized.
    pub fn item_index(&self, key: u64) -> Option<usize> {
        self.inner.state.lock().unwrap().item_index(key)
    }

    /// Window index of the last reported visible position, if it still
    /// falls within the window.
    pub fn current_position(&self) -> Option<usize> {
        self.inner.state.lock().unwrap().current_position()
    }

    /// Total size of the underlying collection, as last reported by the
    /// data source.
    pub fn total_items(&self) -> Option<u64> {
        self.inner.state.lock().unwrap().total_items
    }

    /// Subscriber to the refresh [`LoadState`].
    pub fn refresh_state(&self) -> Subscriber<LoadState> {
        self.inner.refresh_state.subscribe()
    }

    /// Subscriber to the backward-direction [`LoadState`].
    pub fn prepend_state(&self) -> Subscriber<LoadState> {
        self.inner.prepend_state.subscribe()
    }

    /// Subscriber to the forward-direction [`LoadState`].
    pub fn append_state(&self) -> Subscriber<LoadState> {
        self.inner.append_state.subscribe()
    }

    /// Register the load listener, replacing any previous one.
    pub fn set_load_listener(&self, listener: Arc<dyn PagingLoadListener>) {
        *self.inner.listener.lock().unwrap() = Some(listener);
    }

    // --- Internals ---

    /// Settles a failed append/prepend load: stale failures only clear the
    /// loading flag, current ones surface through the direction's state
    /// and the listener. The state mirror is updated inside the same
    /// critical section that clears the flag.
    fn settle_load_error(&self, direction: Direction, generation: u64, error: PagingError) {
        let observable = match direction {
            Direction::Append => &self.inner.append_state,
            Direction::Prepend => &self.inner.prepend_state,
        };

        let error = Arc::new(error);
        let stale = {
            let mut state = self.inner.state.lock().unwrap();
            match direction {
                Direction::Append => state.append_in_flight = false,
                Direction::Prepend => state.prepend_in_flight = false,
            }
            let stale = state.generation != generation;
            observable.set(if stale {
                LoadState::NotLoading
            } else {
                LoadState::Error(error.clone())
            });
            stale
        };

        if stale {
            trace!("discarding superseded failed load");
        } else {
            self.notify_error(&error);
        }
    }

    fn notify_error(&self, error: &Arc<PagingError>) {
        warn!("cannot load page: {error}");
        if let Some(listener) = self.inner.listener.lock().unwrap().clone() {
            listener.on_error(error);
        }
    }

    fn notify_success(&self) {
        if let Some(listener) = self.inner.listener.lock().unwrap().clone() {
            listener.on_success();
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Direction {
    Prepend,
    Append,
}
