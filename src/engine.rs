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

//! Booking lifecycle engine.
//!
//! The [`Engine`] is the sole authority over booking state: it owns the
//! keyed store and routes every confirm/cancel/payment/modification
//! operation through the per-record state machine.
//!
//! # Operations
//!
//! - **Create**: registers a new booking in `pending`/`pending`.
//! - **Confirm / Cancel**: booking status transitions.
//! - **Mark payment**: payment status transitions on the independent axis.
//! - **Request / approve / deny modification**: the customer-initiated
//!   change workflow.
//! - **Add message**: customer/admin conversation thread.
//! - **Get / list / search**: read-only snapshots.
//!
//! # Thread Safety
//!
//! The engine uses [`DashMap`] for concurrent access to bookings. Each
//! record carries its own mutex, so operations on different bookings
//! proceed in parallel while writers to one booking are serialized.

use crate::base::{Actor, BookingId};
use crate::booking::{Booking, BookingAction, BookingView, NewBooking, PaymentStatus};
use crate::error::BookingError;
use crate::event::{BookingEvent, BookingEventKind, EventBus, HandlerResult};
use crate::query::{self, SearchCriteria};
use crate::request::{ApprovalChanges, ModificationKind};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::time::Duration;

/// Booking store plus transition engine and modification manager.
///
/// # Invariants
///
/// - Booking IDs are unique; creation is an atomic check-and-insert.
/// - Status and payment status only move along their allowed edges.
/// - At most one open modification request exists per booking.
/// - Every successful mutation appends exactly one timeline entry and
///   emits exactly one domain event, in that order; the event is
///   published after the record lock is released and its delivery never
///   affects the stored state.
pub struct Engine {
    /// Bookings indexed by ID.
    bookings: DashMap<BookingId, Booking>,
    /// Subscription point for the notification dispatcher.
    events: EventBus,
    /// Caller deadline for record-lock acquisition; `None` waits.
    lock_deadline: Option<Duration>,
}

impl Engine {
    /// Creates a new engine with no bookings. Mutations wait on record
    /// locks without a deadline.
    pub fn new() -> Self {
        Engine {
            bookings: DashMap::new(),
            events: EventBus::new(),
            lock_deadline: None,
        }
    }

    /// Like [`Engine::new`], but lock acquisition that exceeds `deadline`
    /// fails with [`BookingError::Busy`] instead of waiting.
    pub fn with_lock_timeout(deadline: Duration) -> Self {
        Engine {
            lock_deadline: Some(deadline),
            ..Self::new()
        }
    }

    /// Registers a notification handler for every subsequent event.
    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&BookingEvent) -> HandlerResult + Send + Sync + 'static,
    {
        self.events.subscribe(handler);
    }

    /// Registers a new booking.
    ///
    /// # Errors
    ///
    /// - [`BookingError::DuplicateBooking`] - Booking ID already exists.
    /// - [`BookingError::InvalidDateRange`] - Start date after end date.
    /// - [`BookingError::InvalidGuests`] - Zero guests.
    /// - [`BookingError::InvalidAmount`] - Negative amount.
    pub fn create(&self, spec: NewBooking, actor: Actor) -> Result<BookingView, BookingError> {
        let booking_id = spec.id.clone();

        // Entry API for atomic check-and-insert so two submissions with
        // the same ID cannot both win.
        let view = match self.bookings.entry(booking_id.clone()) {
            Entry::Occupied(_) => return Err(BookingError::DuplicateBooking),
            Entry::Vacant(entry) => {
                let booking = Booking::new(spec, actor)?;
                let view = booking.snapshot();
                entry.insert(booking);
                view
            }
        };

        tracing::debug!(booking = %booking_id, "booking created");
        self.events.publish(BookingEvent {
            booking_id,
            kind: BookingEventKind::Created,
        });
        Ok(view)
    }

    /// Applies an action to an existing booking and returns the updated
    /// snapshot.
    ///
    /// The state change and its timeline entry happen in one critical
    /// section; the domain event is published after the lock is released.
    ///
    /// # Errors
    ///
    /// - [`BookingError::NotFound`] - Unknown booking ID.
    /// - [`BookingError::Busy`] - Record lock deadline exceeded.
    /// - Any state-machine error from the action itself.
    pub fn apply(
        &self,
        booking_id: &BookingId,
        action: BookingAction,
    ) -> Result<BookingView, BookingError> {
        let booking = self
            .bookings
            .get(booking_id)
            .ok_or(BookingError::NotFound)?;
        let (kind, view) = booking.apply_within(self.lock_deadline, action)?;
        drop(booking);

        tracing::debug!(booking = %booking_id, event = ?kind, "booking updated");
        self.events.publish(BookingEvent {
            booking_id: booking_id.clone(),
            kind,
        });
        Ok(view)
    }

    /// `pending → confirmed`.
    pub fn confirm(
        &self,
        booking_id: &BookingId,
        actor: Actor,
    ) -> Result<BookingView, BookingError> {
        self.apply(booking_id, BookingAction::Confirm { actor })
    }

    /// `pending | confirmed → cancelled`.
    ///
    /// Never touches the payment status: a paid booking reports
    /// `refund_due` on the snapshot and the `Cancelled` event, and the
    /// refund is a separate [`Engine::mark_payment`] call.
    pub fn cancel(
        &self,
        booking_id: &BookingId,
        actor: Actor,
        reason: Option<String>,
    ) -> Result<BookingView, BookingError> {
        self.apply(booking_id, BookingAction::Cancel { actor, reason })
    }

    /// Moves the payment status along its allowed edges.
    pub fn mark_payment(
        &self,
        booking_id: &BookingId,
        actor: Actor,
        status: PaymentStatus,
    ) -> Result<BookingView, BookingError> {
        self.apply(booking_id, BookingAction::MarkPayment { actor, status })
    }

    /// Opens a modification request on behalf of the customer.
    pub fn request_modification(
        &self,
        booking_id: &BookingId,
        kind: ModificationKind,
        details: impl Into<String>,
    ) -> Result<BookingView, BookingError> {
        self.apply(
            booking_id,
            BookingAction::RequestModification {
                kind,
                details: details.into(),
            },
        )
    }

    /// Approves the open request, applying the field changes it asked
    /// for. `changes` must match the request kind.
    pub fn approve_modification(
        &self,
        booking_id: &BookingId,
        changes: ApprovalChanges,
        note: Option<String>,
    ) -> Result<BookingView, BookingError> {
        self.apply(
            booking_id,
            BookingAction::ApproveModification {
                actor: Actor::Admin,
                changes,
                note,
            },
        )
    }

    /// Denies the open request and restores the pre-request status.
    pub fn deny_modification(
        &self,
        booking_id: &BookingId,
        note: Option<String>,
    ) -> Result<BookingView, BookingError> {
        self.apply(
            booking_id,
            BookingAction::DenyModification {
                actor: Actor::Admin,
                note,
            },
        )
    }

    /// Appends to the booking's conversation thread.
    pub fn add_message(
        &self,
        booking_id: &BookingId,
        sender: Actor,
        content: impl Into<String>,
    ) -> Result<BookingView, BookingError> {
        self.apply(
            booking_id,
            BookingAction::AddMessage {
                sender,
                content: content.into(),
            },
        )
    }

    /// Retrieves a consistent snapshot of one booking.
    pub fn get(&self, booking_id: &BookingId) -> Result<BookingView, BookingError> {
        self.bookings
            .get(booking_id)
            .map(|booking| booking.snapshot())
            .ok_or(BookingError::NotFound)
    }

    /// Snapshots of all bookings, in store order.
    pub fn bookings(&self) -> Vec<BookingView> {
        self.bookings
            .iter()
            .map(|entry| entry.value().snapshot())
            .collect()
    }

    /// Filtered, deterministically sorted snapshots for admin listings.
    ///
    /// Read-only; concurrent writers see no effect from a search.
    pub fn search(&self, criteria: &SearchCriteria) -> Vec<BookingView> {
        query::search(self.bookings(), criteria)
    }

    /// Returns an iterator over all booking records.
    ///
    /// Useful for generating output reports of booking states.
    pub fn records(
        &self,
    ) -> impl Iterator<Item = dashmap::mapref::multiple::RefMulti<'_, BookingId, Booking>> {
        self.bookings.iter()
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
