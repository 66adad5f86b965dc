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

//! Error types for booking operations.

use thiserror::Error;

/// Booking operation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Referenced booking ID does not exist
    #[error("booking not found")]
    NotFound,

    /// A booking with this ID already exists
    #[error("duplicate booking ID")]
    DuplicateBooking,

    /// Start date is after end date
    #[error("invalid date range (start must not be after end)")]
    InvalidDateRange,

    /// Guest count is zero
    #[error("invalid guest count (must be at least 1)")]
    InvalidGuests,

    /// Amount is negative
    #[error("invalid amount (must not be negative)")]
    InvalidAmount,

    /// Requested booking status change is not an allowed edge
    #[error("invalid status transition")]
    InvalidTransition,

    /// Requested payment status change is not an allowed edge
    #[error("invalid payment status transition")]
    InvalidPaymentTransition,

    /// An open modification request already exists for this booking
    #[error("a modification request is already pending")]
    ConflictingRequest,

    /// No open modification request to approve or deny
    #[error("no pending modification request")]
    NoOpenRequest,

    /// Approval payload does not match the request kind
    #[error("approval is missing the fields required by the request kind")]
    IncompleteApproval,

    /// Operation is not valid in the booking's current state
    #[error("operation not valid in the current booking state")]
    InvalidState,

    /// Record lock could not be acquired within the caller deadline
    #[error("booking is busy (lock deadline exceeded)")]
    Busy,
}
