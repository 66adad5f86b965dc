// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Append-only audit types.
//!
//! Timeline entries and messages are never edited or removed. Corrections
//! are made with a compensating entry. Ordering within a booking comes from
//! a per-record sequence counter, not wall-clock time, so entries written
//! in the same millisecond (or across clock skew) still order correctly.

use crate::base::Actor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One audit event in a booking's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Position in the booking's history. Strictly increasing, shared with
    /// the message sequence so the merged history is totally ordered.
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub actor: Actor,
}

/// One message in the customer/admin conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Drawn from the same counter as [`TimelineEntry::seq`].
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub sender: Actor,
    pub content: String,
}
