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

use async_trait::async_trait;

use crate::error::PagingError;

/// A successfully loaded page of items.
#[derive(Clone, Debug)]
pub struct LoadedPage<T> {
    /// Total number of items available in the underlying collection, as
    /// reported by the data source at the time of this load.
    pub total: u64,

    /// The loaded items, ordered by ascending virtual index.
    pub items: Vec<T>,
}

/// An ordered collection that can be read page by page.
///
/// This is the sole seam between a [`PagingList`] and whatever actually
/// holds the data — typically a remote, end-to-end-encrypted message store
/// reached through an SDK call. Fetches never overlap per direction by
/// construction, but the source must not assume single-threaded calling:
/// a refresh and a prepend issued just before it may still race on the
/// wire.
///
/// Fetches are assumed to be idempotent reads; a superseded result is
/// simply discarded, no cancellation signal is ever sent.
///
/// [`PagingList`]: crate::PagingList
#[async_trait]
pub trait PagedDataSource: Send + Sync {
    /// The item type served by this source.
    type Item;

    /// Load up to `size` items starting at the given virtual index.
    ///
    /// A result shorter than `size` means the collection ends within the
    /// requested range.
    async fn load_page(
        &self,
        start: u64,
        size: usize,
    ) -> Result<LoadedPage<Self::Item>, PagingError>;
}
