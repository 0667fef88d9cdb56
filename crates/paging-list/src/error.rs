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

/// An error that happened when using a [`PagingList`].
///
/// [`Source`] failures are recoverable: they surface through the relevant
/// direction's [`LoadState`] and the load listener, leave the window
/// untouched, and the caller may simply trigger the same load again. The
/// other variants are contract violations returned synchronously to the
/// caller of the offending method.
///
/// [`PagingList`]: crate::PagingList
/// [`LoadState`]: crate::LoadState
/// [`Source`]: PagingError::Source
#[derive(Debug, thiserror::Error)]
pub enum PagingError {
    /// The data source failed to load a page.
    #[error("the data source failed to load {size} items starting at {start}")]
    Source {
        /// Virtual index the failed request started at.
        start: u64,
        /// Number of items the failed request asked for.
        size: usize,
        /// The underlying data-source error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An index outside the current window was passed to a mutation method.
    #[error("index {index} is out of bounds for a window of {len} items")]
    OutOfBounds {
        /// The offending index.
        index: usize,
        /// The window length at the time of the call.
        len: usize,
    },

    /// Out-of-band items may only be appended once the forward edge is
    /// known to be exhausted, otherwise their virtual indices would clash
    /// with items still fetchable in that direction.
    #[error("cannot append out-of-band items while the forward edge may still grow")]
    ForwardEdgeOpen,

    /// Mirror of [`ForwardEdgeOpen`](PagingError::ForwardEdgeOpen) for
    /// the backward edge.
    #[error("cannot prepend out-of-band items while the backward edge may still grow")]
    BackwardEdgeOpen,

    /// A structural splice was attempted while a load is in flight.
    ///
    /// When the caller asked for the paging keys to be shifted anyway, the
    /// shift has been applied; the splice itself still did not happen and
    /// must be retried once the load settles.
    #[error("cannot splice items while a load is in flight")]
    LoadInFlight,
}
