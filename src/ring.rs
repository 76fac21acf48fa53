// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/ring.rs - Ring buffer linearization for GfxApiLogger streams.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

/*!
 * # `ring` Module
 *
 * Turns the logger's circular data region into one linear buffer.
 *
 * ```text
 * physical: | newer ... | older ...............|
 *                       ^ committed_index
 * linear:   | older ...............| newer ... |
 * ```
 */

use std::borrow::Cow;

use tracing::trace;

/// Unrolls the ring buffer so that the oldest byte comes first.
///
/// The logger wraps writes at `data.len()`, and `committed_index` is where the
/// next write would land. The result is `data[committed_index..]` followed by
/// `data[..committed_index]`. With no rotation the input is borrowed as is.
///
/// # Panics
///
/// Panics if `committed_index > data.len()`. The header parser rejects such
/// headers, so reaching this is a caller bug.
pub fn linearize(data: &[u8], committed_index: usize) -> Cow<'_, [u8]> {
    assert!(
        committed_index <= data.len(),
        "committed index {} is past the end of a {}-byte ring buffer",
        committed_index,
        data.len()
    );

    if committed_index == 0 {
        return Cow::Borrowed(data);
    }

    trace!(committed_index, len = data.len(), "rotating ring buffer");

    let (newer, older) = data.split_at(committed_index);
    let mut linear = Vec::with_capacity(data.len());
    linear.extend_from_slice(older);
    linear.extend_from_slice(newer);
    Cow::Owned(linear)
}
