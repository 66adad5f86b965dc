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

//! Admin search over booking snapshots.
//!
//! Read-only: filtering and sorting operate on owned [`BookingView`]
//! snapshots and never touch the store. Results are deterministic — every
//! sort breaks ties by booking ID ascending.

use crate::booking::{BookingStatus, BookingView, PaymentStatus};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort order for listing views. Always ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Customer name.
    Name,
    /// Booking amount.
    #[serde(alias = "price")]
    Amount,
    /// Creation time.
    #[serde(alias = "date")]
    Created,
    /// Booking ID.
    Id,
}

/// Filter and sort criteria for [`search`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Case-insensitive substring over customer name, email, package
    /// reference, and destination.
    pub text: Option<String>,
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
    /// Defaults to [`SortKey::Id`].
    pub sort: Option<SortKey>,
}

impl SearchCriteria {
    fn matches(&self, view: &BookingView) -> bool {
        if let Some(status) = self.status {
            if view.status != status {
                return false;
            }
        }
        if let Some(payment_status) = self.payment_status {
            if view.payment_status != payment_status {
                return false;
            }
        }
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            if !needle.is_empty() {
                let haystacks = [
                    &view.customer.name,
                    &view.customer.email,
                    &view.package_ref,
                    &view.destination,
                ];
                if !haystacks
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
                {
                    return false;
                }
            }
        }
        true
    }
}

fn compare(key: SortKey, a: &BookingView, b: &BookingView) -> Ordering {
    let primary = match key {
        SortKey::Name => a.customer.name.cmp(&b.customer.name),
        SortKey::Amount => a.amount.cmp(&b.amount),
        SortKey::Created => a.created_at.cmp(&b.created_at),
        SortKey::Id => Ordering::Equal,
    };
    primary.then_with(|| a.id.as_str().cmp(b.id.as_str()))
}

/// Filters and sorts booking snapshots per the criteria.
pub fn search(mut views: Vec<BookingView>, criteria: &SearchCriteria) -> Vec<BookingView> {
    views.retain(|view| criteria.matches(view));
    let key = criteria.sort.unwrap_or(SortKey::Id);
    views.sort_by(|a, b| compare(key, a, b));
    views
}
