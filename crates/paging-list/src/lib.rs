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

//! An incremental, bidirectional pagination engine for scrollable lists
//! backed by asynchronous page loads.
//!
//! [`PagingList`] owns a contiguous, in-memory slice (the *window*) of a
//! larger virtual collection whose boundaries are only discovered through
//! page fetches. It loads forward and backward on demand, discards results
//! superseded by a refresh, de-duplicates at window boundaries when the
//! virtual index space shifted under an in-flight request, and trims the
//! window around the last visible position once it grows past a configured
//! bound.
//!
//! The window itself is an [`eyeball_im::ObservableVector`], so a UI layer
//! can subscribe to it and apply [`VectorDiff`]s incrementally; the
//! per-direction [`LoadState`]s are published through
//! [`eyeball::SharedObservable`]s and drive loading indicators.
//!
//! The actual data lives behind the [`PagedDataSource`] trait: a single
//! `load_page(start, size)` entry point, typically backed by a messaging
//! SDK or any other remote, ordered collection. Real-time events that
//! insert or remove items out of band are applied through the splice
//! methods ([`PagingList::append`], [`PagingList::prepend`],
//! [`PagingList::remove_if`], …) under the same single-writer discipline as
//! fetch results.

mod config;
mod error;
mod list;
mod source;
mod state;

#[cfg(test)]
mod test_utils;

pub use eyeball::Subscriber;
pub use eyeball_im::VectorDiff;
pub use imbl::Vector;

pub use self::{
    config::PagingConfig,
    error::PagingError,
    list::{PagingList, PagingListBuilder, PagingLoadListener},
    source::{LoadedPage, PagedDataSource},
    state::LoadState,
};
