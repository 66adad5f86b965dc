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

//! Modification request management.
//!
//! Requests follow a state machine:
//! - [`Pending`] → [`Approved`] (via approve, with matching field changes)
//! - [`Pending`] → [`Denied`] (via deny)
//!
//! A booking holds at most one request with status [`Pending`] at a time.
//!
//! [`Pending`]: ModificationStatus::Pending
//! [`Approved`]: ModificationStatus::Approved
//! [`Denied`]: ModificationStatus::Denied

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What the customer wants changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ModificationKind {
    DateChange,
    GuestCountChange,
    PackageChange,
}

impl ModificationKind {
    /// Human-readable label used in timeline actions.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DateChange => "date change",
            Self::GuestCountChange => "guest count change",
            Self::PackageChange => "package change",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModificationStatus {
    Pending,
    Approved,
    Denied,
}

/// A customer-initiated change proposal awaiting admin resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationRequest {
    pub requested_at: DateTime<Utc>,
    pub kind: ModificationKind,
    /// Free-text description supplied by the customer.
    pub details: String,
    pub status: ModificationStatus,
    /// Note left by the admin when approving or denying.
    pub resolution_note: Option<String>,
}

impl ModificationRequest {
    pub fn new(kind: ModificationKind, details: impl Into<String>) -> Self {
        Self {
            requested_at: Utc::now(),
            kind,
            details: details.into(),
            status: ModificationStatus::Pending,
            resolution_note: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == ModificationStatus::Pending
    }
}

/// The field changes an approval applies to the booking.
///
/// An approval must carry the variant matching the request's declared
/// [`ModificationKind`]; anything else is rejected as an incomplete
/// approval before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApprovalChanges {
    /// New travel window for a [`ModificationKind::DateChange`] request.
    Dates {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    /// New party size for a [`ModificationKind::GuestCountChange`] request.
    Guests { guests: u32 },
    /// Replacement package (and its price) for a
    /// [`ModificationKind::PackageChange`] request.
    Package {
        package_ref: String,
        amount: Decimal,
    },
}

impl ApprovalChanges {
    /// Whether this payload satisfies the given request kind.
    pub fn matches(&self, kind: ModificationKind) -> bool {
        matches!(
            (self, kind),
            (Self::Dates { .. }, ModificationKind::DateChange)
                | (Self::Guests { .. }, ModificationKind::GuestCountChange)
                | (Self::Package { .. }, ModificationKind::PackageChange)
        )
    }
}
