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

/// Configuration of a [`PagingList`], immutable per list instance.
///
/// [`PagingList`]: crate::PagingList
#[derive(Clone, Copy, Debug)]
pub struct PagingConfig {
    /// Virtual index the initial refresh starts from.
    pub initial_index: u64,

    /// Number of items requested by a refresh.
    pub initial_page_size: usize,

    /// Number of items requested by a forward or backward page load.
    pub page_size: usize,

    /// How close the visible position may get to a window edge, in pages,
    /// before the next load in that direction is triggered.
    pub prefetch_distance: usize,

    /// Upper bound on the number of items kept in memory.
    ///
    /// Only effective when greater than `page_size`; `None` disables
    /// trimming entirely.
    pub max_window_size: Option<usize>,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            initial_index: 0,
            initial_page_size: 20,
            page_size: 10,
            prefetch_distance: 3,
            max_window_size: None,
        }
    }
}

impl PagingConfig {
    /// The index distance from a window edge below which a prefetch is
    /// triggered.
    pub(crate) fn prefetch_reach(&self) -> usize {
        self.prefetch_distance * self.page_size
    }

    /// The effective window bound, if trimming is enabled at all.
    pub(crate) fn effective_max_window_size(&self) -> Option<usize> {
        self.max_window_size.filter(|max| *max > self.page_size)
    }
}
