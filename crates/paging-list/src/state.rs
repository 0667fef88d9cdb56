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

//! The window state: the materialized slice of the virtual collection, its
//! two boundary keys, and everything that mutates them.
//!
//! All of it lives behind one mutex owned by [`PagingList`], and every
//! method here runs inside that critical section. The async orchestration
//! (claiming a direction, fetching, generation checks) lives in
//! [`crate::list`]; this module only knows how to merge an already-fetched
//! page, splice out-of-band items and keep the window within its bound.
//!
//! [`PagingList`]: crate::PagingList

use std::sync::Arc;

use eyeball_im::{ObservableVector, VectorSubscriber};
use imbl::Vector;

use crate::{config::PagingConfig, error::PagingError, source::LoadedPage};

/// Equivalence of two items under the caller-supplied identity function.
pub(crate) type IdentityFn<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Loading state of one direction (refresh, prepend or append) of a
/// [`PagingList`].
///
/// [`PagingList`]: crate::PagingList
#[derive(Clone, Debug, Default)]
pub enum LoadState {
    /// The direction is at rest.
    #[default]
    NotLoading,

    /// A load is in flight in this direction.
    Loading,

    /// The last load in this direction failed.
    ///
    /// Cleared by the next load attempt in the same direction, or by a
    /// refresh.
    Error(Arc<PagingError>),
}

impl LoadState {
    /// Whether this is [`LoadState::Loading`].
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

impl PartialEq for LoadState {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotLoading, Self::NotLoading) | (Self::Loading, Self::Loading) => true,
            (Self::Error(a), Self::Error(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Boundary marker for one edge of the window.
///
/// `key` is a virtual index just outside the window: one past the last
/// element for the forward edge, `page_size` below the first element for
/// the backward edge (which is why it can go negative near the start of
/// the collection). `end_reached` is terminal for the edge until a refresh
/// or a trim invalidates it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PagingKey {
    pub key: i64,
    pub end_reached: bool,
}

impl PagingKey {
    fn new(key: i64) -> Self {
        Self { key, end_reached: false }
    }
}

/// The mutex-guarded unit: window items, both paging keys, the visible
/// position, the refresh generation and the per-direction in-flight flags.
pub(crate) struct WindowState<T: Clone + Send + Sync + 'static> {
    items: ObservableVector<T>,

    pub(crate) previous_page_key: PagingKey,
    pub(crate) next_page_key: PagingKey,

    /// Virtual index of the last reported visible item.
    pub(crate) current_key: i64,

    /// Total size of the underlying collection, as last reported by the
    /// data source.
    pub(crate) total_items: Option<u64>,

    /// Bumped by every refresh; loads carrying an older generation are
    /// discarded on completion.
    pub(crate) generation: u64,

    pub(crate) refresh_in_flight: bool,
    pub(crate) append_in_flight: bool,
    pub(crate) prepend_in_flight: bool,

    config: PagingConfig,
}

impl<T: Clone + Send + Sync + 'static> WindowState<T> {
    pub(crate) fn new(config: PagingConfig) -> Self {
        let initial = config.initial_index as i64;
        Self {
            items: ObservableVector::new(),
            previous_page_key: PagingKey::new(initial),
            next_page_key: PagingKey::new(initial),
            current_key: initial,
            total_items: None,
            generation: 0,
            refresh_in_flight: false,
            append_in_flight: false,
            prepend_in_flight: false,
            config,
        }
    }

    // --- Read access ---

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn item_at(&self, index: usize) -> Option<T> {
        self.items.get(index).cloned()
    }

    pub(crate) fn snapshot(&self) -> Vector<T> {
        (*self.items).clone()
    }

    pub(crate) fn subscribe(&self) -> VectorSubscriber<T> {
        self.items.subscribe()
    }

    /// Virtual index of the window's first element.
    ///
    /// Zero once the backward edge is exhausted: the window then starts at
    /// the very beginning of the collection, whatever the raw key says.
    pub(crate) fn first_key(&self) -> i64 {
        if self.previous_page_key.end_reached {
            0
        } else {
            self.previous_page_key.key + self.config.page_size as i64
        }
    }

    pub(crate) fn has_key(&self, key: u64) -> bool {
        let key = key as i64;
        let first = self.first_key();
        key >= first && key <= first + self.items.len() as i64
    }

    pub(crate) fn item_index(&self, key: u64) -> Option<usize> {
        let key = key as i64;
        let first = self.first_key();
        (key >= first && key < self.next_page_key.key).then(|| (key - first) as usize)
    }

    pub(crate) fn item_key(&self, index: usize) -> u64 {
        (self.first_key() + index as i64).max(0) as u64
    }

    pub(crate) fn current_position(&self) -> Option<usize> {
        let position = self.current_key - self.first_key();
        (position >= 0 && (position as usize) < self.items.len()).then(|| position as usize)
    }

    pub(crate) fn any_load_in_flight(&self) -> bool {
        self.refresh_in_flight || self.append_in_flight || self.prepend_in_flight
    }

    // --- Merging fetched pages ---

    /// Clears the window and resets both keys ahead of a refresh fetch.
    ///
    /// Returns the new generation and the forward key at issue time; the
    /// latter lets [`apply_refresh`](Self::apply_refresh) detect key shifts
    /// that happened while the fetch was in flight.
    pub(crate) fn begin_refresh(&mut self, start: i64) -> (u64, i64) {
        self.generation += 1;
        self.items.clear();
        self.previous_page_key = PagingKey::new(start);
        self.next_page_key = PagingKey::new(start);
        self.current_key = start;
        (self.generation, self.next_page_key.key)
    }

    /// Merges the result of a refresh fetch issued at `start` for
    /// `requested` items.
    pub(crate) fn apply_refresh(
        &mut self,
        start: i64,
        next_key_at_start: i64,
        requested: usize,
        page: LoadedPage<T>,
    ) {
        // Non-zero when a `prepend(.., increase)` shifted the keys while
        // the fetch was in flight.
        let offset = self.next_page_key.key - next_key_at_start;
        let returned = page.items.len();

        self.total_items = Some(page.total);
        self.items.append(page.items.into_iter().collect());

        self.next_page_key.key = start + returned as i64 + offset;
        if offset == 0 && returned < requested {
            self.next_page_key.end_reached = true;
        }

        self.previous_page_key.key = start - self.config.page_size as i64 + offset;
        if offset == 0 && (returned == 0 || start == 0) {
            self.previous_page_key.end_reached = true;
        }
    }

    /// Merges the result of a forward page fetch issued at
    /// `requested_start`, returning how many items were actually appended.
    pub(crate) fn apply_append(
        &mut self,
        requested_start: i64,
        page: LoadedPage<T>,
        identity: Option<&IdentityFn<T>>,
    ) -> usize {
        self.total_items = Some(page.total);

        let raw_len = page.items.len();
        // Items below the current forward key are already in the window;
        // this happens when the previous page grew under a concurrent
        // prepend shifting the index space.
        let offset = (self.next_page_key.key - requested_start).max(0) as usize;

        let mut appended = 0;
        if offset < raw_len {
            let mut items = page.items;
            let mut rest = items.split_off(offset);

            if let Some(same) = identity {
                if let Some(last) = self.items.last().cloned() {
                    if let Some(dup) = rest.iter().rposition(|item| same(item, &last)) {
                        rest = rest.split_off(dup + 1);
                    }
                }
            }

            appended = rest.len();
            self.items.append(rest.into_iter().collect());
            self.next_page_key.key += appended as i64;
        }

        if raw_len == 0 && offset == 0 {
            self.next_page_key.end_reached = true;
        }

        self.trim_front_overflow();
        appended
    }

    /// Merges the result of a backward page fetch issued at `start` (after
    /// clamping), returning how many items were actually prepended.
    ///
    /// The caller has already verified that the backward key did not move
    /// while the fetch was in flight.
    pub(crate) fn apply_prepend(
        &mut self,
        start: i64,
        page: LoadedPage<T>,
        identity: Option<&IdentityFn<T>>,
    ) -> usize {
        self.total_items = Some(page.total);

        let raw_len = page.items.len();
        let mut front = page.items;

        if let Some(same) = identity {
            if let Some(first) = self.items.front().cloned() {
                if let Some(dup) = front.iter().position(|item| same(item, &first)) {
                    front.truncate(dup);
                }
            }
        }

        let prepended = front.len();
        for item in front.into_iter().rev() {
            self.items.push_front(item);
        }

        if raw_len == 0 || start == 0 {
            self.previous_page_key.key = -(self.config.page_size as i64);
            self.previous_page_key.end_reached = true;
        } else {
            self.previous_page_key.key = start - raw_len as i64;
        }

        self.trim_back_overflow();
        prepended
    }

    // --- Out-of-band splices ---

    /// Appends items pushed by the external event stream.
    ///
    /// Only index-consistent once the forward edge is exhausted: the items
    /// then really are the new tail of the collection.
    pub(crate) fn splice_back(&mut self, items: Vec<T>) -> Result<(), PagingError> {
        if !self.next_page_key.end_reached {
            return Err(PagingError::ForwardEdgeOpen);
        }

        let added = items.len();
        self.items.append(items.into_iter().collect());
        self.next_page_key.key += added as i64;
        self.total_items = self.total_items.map(|total| total + added as u64);

        self.trim_front_overflow();
        Ok(())
    }

    /// Prepends items pushed by the external event stream.
    ///
    /// While any load is in flight the window cannot be touched; with
    /// `increase` the caller may still shift both keys by the inserted
    /// count so that the in-flight result is merged against the shifted
    /// index space. The error is returned either way, to signal that the
    /// structural insert did not happen.
    pub(crate) fn splice_front(&mut self, items: Vec<T>, increase: bool) -> Result<(), PagingError> {
        if self.any_load_in_flight() {
            if increase {
                let added = items.len() as i64;
                self.previous_page_key.key += added;
                self.next_page_key.key += added;
            }
            return Err(PagingError::LoadInFlight);
        }

        if !self.previous_page_key.end_reached {
            return Err(PagingError::BackwardEdgeOpen);
        }

        let added = items.len();
        for item in items.into_iter().rev() {
            self.items.push_front(item);
        }
        self.next_page_key.key += added as i64;
        self.total_items = self.total_items.map(|total| total + added as u64);

        self.trim_back_overflow();
        Ok(())
    }

    pub(crate) fn replace(&mut self, index: usize, item: T) -> Result<T, PagingError> {
        if index >= self.items.len() {
            return Err(PagingError::OutOfBounds { index, len: self.items.len() });
        }
        Ok(self.items.set(index, item))
    }

    pub(crate) fn replace_all<F: FnMut(&T) -> T>(&mut self, mut op: F) {
        for index in 0..self.items.len() {
            let replacement = op(&self.items[index]);
            self.items.set(index, replacement);
        }
    }

    /// Removes every item matching the predicate and retreats the forward
    /// key accordingly, so that `next_page_key.key - first_key` keeps
    /// matching the window length.
    pub(crate) fn remove_if<F: FnMut(&T) -> bool>(&mut self, mut predicate: F) -> usize {
        let mut index = 0;
        let mut removed = 0;
        while index < self.items.len() {
            if predicate(&self.items[index]) {
                self.items.remove(index);
                removed += 1;
            } else {
                index += 1;
            }
        }

        if removed > 0 {
            self.next_page_key.key -= removed as i64;
            self.total_items = self.total_items.map(|total| total.saturating_sub(removed as u64));
        }
        removed
    }

    // --- Bounded-window trimming ---

    /// Index of the last reported visible item within the window, clamped
    /// into range.
    fn cursor_index(&self, len: usize) -> usize {
        (self.current_key - self.first_key()).clamp(0, len as i64 - 1) as usize
    }

    /// Whether trimming applies at all right now.
    fn overflow(&self) -> Option<usize> {
        let max = self.config.effective_max_window_size()?;
        let len = self.items.len();
        (len > max && self.current_key > 0).then(|| len - max)
    }

    /// After growth at the back: trim from the front, but never past one
    /// page of history behind the cursor.
    fn trim_front_overflow(&mut self) {
        let Some(excess) = self.overflow() else { return };
        let len = self.items.len();
        let cursor = self.cursor_index(len);

        let trim = excess.min(cursor.saturating_sub(self.config.page_size));
        if trim == 0 {
            return;
        }

        for _ in 0..trim {
            self.items.pop_front();
        }
        // The trimmed-off items still exist upstream; the backward edge
        // must be re-fetchable even if it was believed exhausted.
        self.previous_page_key.key =
            (self.previous_page_key.key + trim as i64).min(self.next_page_key.key);
        self.previous_page_key.end_reached = false;
    }

    /// After growth at the front: trim from the back, but never past one
    /// page ahead of the cursor.
    fn trim_back_overflow(&mut self) {
        let Some(excess) = self.overflow() else { return };
        let len = self.items.len();
        let cursor = self.cursor_index(len);

        let keep = (cursor + self.config.page_size + 1).min(len);
        let trim = excess.min(len - keep);
        if trim == 0 {
            return;
        }

        self.items.truncate(len - trim);
        self.next_page_key.key = (self.next_page_key.key - trim as i64).max(self.first_key());
        self.next_page_key.end_reached = false;
    }
}
