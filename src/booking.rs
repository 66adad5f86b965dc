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

//! Booking records.
//!
//! Implemented State Machine
//!
//! # Example
//!
//! ```
//! use booking_engine_rs::{Actor, Booking, BookingAction, BookingStatus, NewBooking};
//!
//! let booking = Booking::new(NewBooking::sample("B-1"), Actor::Customer).unwrap();
//! booking.apply(BookingAction::Confirm { actor: Actor::Admin }).unwrap();
//! assert_eq!(booking.status(), BookingStatus::Confirmed);
//! ```

use crate::base::{Actor, BookingId};
use crate::error::BookingError;
use crate::event::BookingEventKind;
use crate::request::{ApprovalChanges, ModificationKind, ModificationRequest, ModificationStatus};
use crate::timeline::{Message, TimelineEntry};
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde::Deserialize;
use std::time::Duration;

/// Booking lifecycle status.
///
//  Pending ──confirm──► Confirmed
//     │                     │
//     ├──request──► ModificationRequested ──approve/deny──► (prior status)
//     │                     │
//     └──cancel──► Cancelled ◄──cancel── Confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    ModificationRequested,
    Cancelled,
}

impl BookingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::ModificationRequested => "modification_requested",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Payment status, independent of the booking status axis.
///
//  Pending ──► PartiallyPaid ──► Paid ──► Refunded
//     └────────────────────────────┘ (skipping PartiallyPaid is allowed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    PartiallyPaid,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        }
    }

    /// Whether `self → next` is an allowed payment edge.
    fn can_become(self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::PartiallyPaid)
                | (Self::Pending, Self::Paid)
                | (Self::PartiallyPaid, Self::Paid)
                | (Self::Paid, Self::Refunded)
        )
    }
}

/// Denormalized customer snapshot held for display.
///
/// The customer record itself is owned elsewhere; this copy is fixed at
/// creation time along with the other identity fields.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct CustomerRef {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Input for creating a booking.
#[derive(Debug, Clone, serde::Serialize, Deserialize)]
pub struct NewBooking {
    pub id: BookingId,
    pub customer: CustomerRef,
    pub package_ref: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guests: u32,
    pub amount: Decimal,
}

impl NewBooking {
    /// A ready-made booking spec for doc examples and tests.
    pub fn sample(id: &str) -> Self {
        Self {
            id: BookingId::from(id),
            customer: CustomerRef {
                name: "Amelia Santos".to_owned(),
                email: "amelia@example.com".to_owned(),
                phone: None,
            },
            package_ref: "PKG-BALI-7D".to_owned(),
            destination: "Bali".to_owned(),
            start_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 9, 8).unwrap(),
            guests: 2,
            amount: Decimal::new(249900, 2),
        }
    }
}

/// A mutation applied to an existing booking.
///
/// The only way booking state changes after creation. Every action
/// validates the current state, applies the change, and appends one
/// timeline entry inside the same critical section.
#[derive(Debug, Clone, serde::Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BookingAction {
    Confirm {
        actor: Actor,
    },
    Cancel {
        actor: Actor,
        reason: Option<String>,
    },
    MarkPayment {
        actor: Actor,
        status: PaymentStatus,
    },
    RequestModification {
        kind: ModificationKind,
        details: String,
    },
    ApproveModification {
        actor: Actor,
        changes: ApprovalChanges,
        note: Option<String>,
    },
    DenyModification {
        actor: Actor,
        note: Option<String>,
    },
    AddMessage {
        sender: Actor,
        content: String,
    },
}

#[derive(Debug)]
struct BookingState {
    id: BookingId,
    customer: CustomerRef,
    package_ref: String,
    destination: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    guests: u32,
    amount: Decimal,
    status: BookingStatus,
    payment_status: PaymentStatus,
    modification_request: Option<ModificationRequest>,
    /// Status to restore when the open request is resolved.
    status_before_request: Option<BookingStatus>,
    timeline: Vec<TimelineEntry>,
    messages: Vec<Message>,
    /// Next sequence number, shared by timeline entries and messages.
    seq: u64,
    created_at: DateTime<Utc>,
}

impl BookingState {
    fn new(spec: NewBooking, actor: Actor) -> Result<Self, BookingError> {
        if spec.start_date > spec.end_date {
            return Err(BookingError::InvalidDateRange);
        }
        if spec.guests == 0 {
            return Err(BookingError::InvalidGuests);
        }
        if spec.amount < Decimal::ZERO {
            return Err(BookingError::InvalidAmount);
        }

        let mut state = Self {
            id: spec.id,
            customer: spec.customer,
            package_ref: spec.package_ref,
            destination: spec.destination,
            start_date: spec.start_date,
            end_date: spec.end_date,
            guests: spec.guests,
            amount: spec.amount,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            modification_request: None,
            status_before_request: None,
            timeline: Vec::new(),
            messages: Vec::new(),
            seq: 0,
            created_at: Utc::now(),
        };
        state.record("booking created", actor);
        Ok(state)
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.start_date <= self.end_date,
            "Invariant violated: start date after end date on {}",
            self.id
        );
        debug_assert!(
            self.guests >= 1,
            "Invariant violated: guest count dropped to zero on {}",
            self.id
        );
        debug_assert!(
            self.amount >= Decimal::ZERO,
            "Invariant violated: amount went negative on {}",
            self.id
        );
        debug_assert_eq!(
            self.status == BookingStatus::ModificationRequested,
            self.open_request().is_some(),
            "Invariant violated: status and open request disagree on {}",
            self.id
        );
    }

    fn open_request(&self) -> Option<&ModificationRequest> {
        self.modification_request.as_ref().filter(|r| r.is_open())
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.seq;
        self.seq += 1;
        seq
    }

    /// Appends one timeline entry. Infallible: the append shares the
    /// record's critical section with the triggering mutation, so a
    /// mutation is never published without its entry.
    fn record(&mut self, action: impl Into<String>, actor: Actor) {
        let entry = TimelineEntry {
            seq: self.next_seq(),
            timestamp: Utc::now(),
            action: action.into(),
            actor,
        };
        self.timeline.push(entry);
    }

    fn confirm(&mut self, actor: Actor) -> Result<BookingEventKind, BookingError> {
        if self.status != BookingStatus::Pending {
            return Err(BookingError::InvalidTransition);
        }
        self.status = BookingStatus::Confirmed;
        self.record("status changed to confirmed", actor);
        self.assert_invariants();
        Ok(BookingEventKind::Confirmed)
    }

    fn cancel(
        &mut self,
        actor: Actor,
        reason: Option<&str>,
    ) -> Result<BookingEventKind, BookingError> {
        // An open request must be resolved first so the admin never acts
        // against stale customer expectations.
        if self.open_request().is_some() {
            return Err(BookingError::InvalidTransition);
        }
        if !matches!(
            self.status,
            BookingStatus::Pending | BookingStatus::Confirmed
        ) {
            return Err(BookingError::InvalidTransition);
        }
        self.status = BookingStatus::Cancelled;
        let action = match reason {
            Some(reason) => format!("status changed to cancelled: {reason}"),
            None => "status changed to cancelled".to_owned(),
        };
        self.record(action, actor);
        self.assert_invariants();
        // The engine never refunds on its own; it reports that one is due.
        Ok(BookingEventKind::Cancelled {
            refund_due: self.payment_status == PaymentStatus::Paid,
        })
    }

    fn mark_payment(
        &mut self,
        actor: Actor,
        next: PaymentStatus,
    ) -> Result<BookingEventKind, BookingError> {
        if !self.payment_status.can_become(next) {
            return Err(BookingError::InvalidPaymentTransition);
        }
        self.payment_status = next;
        self.record(
            format!("payment status changed to {}", next.label()),
            actor,
        );
        self.assert_invariants();
        Ok(BookingEventKind::PaymentMarked { status: next })
    }

    fn request_modification(
        &mut self,
        kind: ModificationKind,
        details: &str,
    ) -> Result<BookingEventKind, BookingError> {
        if self.status == BookingStatus::Cancelled {
            return Err(BookingError::InvalidState);
        }
        // Compare-and-set under the record lock: at most one open request.
        if self.open_request().is_some() {
            return Err(BookingError::ConflictingRequest);
        }
        self.status_before_request = Some(self.status);
        self.status = BookingStatus::ModificationRequested;
        self.modification_request = Some(ModificationRequest::new(kind, details));
        self.record(format!("modification requested ({})", kind.label()), Actor::Customer);
        self.assert_invariants();
        Ok(BookingEventKind::ModificationRequested { kind })
    }

    fn approve_modification(
        &mut self,
        actor: Actor,
        changes: &ApprovalChanges,
        note: Option<&str>,
    ) -> Result<BookingEventKind, BookingError> {
        let kind = self
            .open_request()
            .map(|r| r.kind)
            .ok_or(BookingError::NoOpenRequest)?;

        // Validate everything before touching state, so a rejected
        // approval leaves the booking exactly as it was.
        if !changes.matches(kind) {
            return Err(BookingError::IncompleteApproval);
        }
        match changes {
            ApprovalChanges::Dates {
                start_date,
                end_date,
            } => {
                if start_date > end_date {
                    return Err(BookingError::InvalidDateRange);
                }
            }
            ApprovalChanges::Guests { guests } => {
                if *guests == 0 {
                    return Err(BookingError::InvalidGuests);
                }
            }
            ApprovalChanges::Package { amount, .. } => {
                if *amount < Decimal::ZERO {
                    return Err(BookingError::InvalidAmount);
                }
            }
        }

        match changes {
            ApprovalChanges::Dates {
                start_date,
                end_date,
            } => {
                self.start_date = *start_date;
                self.end_date = *end_date;
            }
            ApprovalChanges::Guests { guests } => {
                self.guests = *guests;
            }
            ApprovalChanges::Package {
                package_ref,
                amount,
            } => {
                self.package_ref = package_ref.clone();
                self.amount = *amount;
            }
        }

        let request = self
            .modification_request
            .as_mut()
            .expect("open request checked above");
        request.status = ModificationStatus::Approved;
        request.resolution_note = note.map(str::to_owned);

        // Back to confirmed if the booking was confirmed before the
        // request, otherwise back to pending.
        self.status = match self.status_before_request.take() {
            Some(BookingStatus::Confirmed) => BookingStatus::Confirmed,
            _ => BookingStatus::Pending,
        };
        self.record(format!("modification approved ({})", kind.label()), actor);
        self.assert_invariants();
        Ok(BookingEventKind::ModificationApproved { kind })
    }

    fn deny_modification(
        &mut self,
        actor: Actor,
        note: Option<&str>,
    ) -> Result<BookingEventKind, BookingError> {
        let kind = self
            .open_request()
            .map(|r| r.kind)
            .ok_or(BookingError::NoOpenRequest)?;

        let request = self
            .modification_request
            .as_mut()
            .expect("open request checked above");
        request.status = ModificationStatus::Denied;
        request.resolution_note = note.map(str::to_owned);

        self.status = self.status_before_request.take().unwrap_or(BookingStatus::Pending);
        self.record(format!("modification denied ({})", kind.label()), actor);
        self.assert_invariants();
        Ok(BookingEventKind::ModificationDenied { kind })
    }

    fn add_message(&mut self, sender: Actor, content: &str) -> Result<BookingEventKind, BookingError> {
        let message = Message {
            seq: self.next_seq(),
            timestamp: Utc::now(),
            sender,
            content: content.to_owned(),
        };
        self.messages.push(message);
        self.record(format!("message added by {sender}"), sender);
        self.assert_invariants();
        Ok(BookingEventKind::MessageAdded { sender })
    }

    fn view(&self) -> BookingView {
        BookingView {
            id: self.id.clone(),
            customer: self.customer.clone(),
            package_ref: self.package_ref.clone(),
            destination: self.destination.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            guests: self.guests,
            amount: self.amount,
            status: self.status,
            payment_status: self.payment_status,
            modification_request: self.modification_request.clone(),
            timeline: self.timeline.clone(),
            messages: self.messages.clone(),
            created_at: self.created_at,
        }
    }
}

/// A travel booking record.
///
/// All mutable state lives behind a per-record mutex; writers are
/// serialized one at a time and readers clone out a consistent
/// [`BookingView`].
#[derive(Debug)]
pub struct Booking {
    inner: Mutex<BookingState>,
}

impl Booking {
    const AMOUNT_PRECISION: u32 = 2;

    /// Creates a booking in `pending`/`pending`, with a `booking created`
    /// timeline entry.
    pub fn new(spec: NewBooking, actor: Actor) -> Result<Self, BookingError> {
        Ok(Self {
            inner: Mutex::new(BookingState::new(spec, actor)?),
        })
    }

    pub fn id(&self) -> BookingId {
        self.inner.lock().id.clone()
    }

    pub fn status(&self) -> BookingStatus {
        self.inner.lock().status
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.inner.lock().payment_status
    }

    pub fn amount(&self) -> Decimal {
        self.inner.lock().amount
    }

    /// Consistent snapshot of the whole record.
    pub fn snapshot(&self) -> BookingView {
        self.inner.lock().view()
    }

    /// Applies an action, waiting for the record lock.
    pub fn apply(&self, action: BookingAction) -> Result<BookingEventKind, BookingError> {
        self.apply_within(None, action).map(|(kind, _)| kind)
    }

    /// Applies an action; with a deadline, lock acquisition past it fails
    /// with [`BookingError::Busy`] and the record is untouched. Returns
    /// the emitted event together with the post-mutation snapshot, both
    /// taken inside the same critical section.
    pub(crate) fn apply_within(
        &self,
        deadline: Option<Duration>,
        action: BookingAction,
    ) -> Result<(BookingEventKind, BookingView), BookingError> {
        let mut state = self.guard(deadline)?;
        let kind = match &action {
            BookingAction::Confirm { actor } => state.confirm(*actor),
            BookingAction::Cancel { actor, reason } => state.cancel(*actor, reason.as_deref()),
            BookingAction::MarkPayment { actor, status } => state.mark_payment(*actor, *status),
            BookingAction::RequestModification { kind, details } => {
                state.request_modification(*kind, details)
            }
            BookingAction::ApproveModification {
                actor,
                changes,
                note,
            } => state.approve_modification(*actor, changes, note.as_deref()),
            BookingAction::DenyModification { actor, note } => {
                state.deny_modification(*actor, note.as_deref())
            }
            BookingAction::AddMessage { sender, content } => state.add_message(*sender, content),
        }?;
        Ok((kind, state.view()))
    }

    fn guard(
        &self,
        deadline: Option<Duration>,
    ) -> Result<MutexGuard<'_, BookingState>, BookingError> {
        match deadline {
            None => Ok(self.inner.lock()),
            Some(deadline) => self.inner.try_lock_for(deadline).ok_or(BookingError::Busy),
        }
    }
}

/// Owned snapshot of a booking, safe to hold without any lock.
#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
pub struct BookingView {
    pub id: BookingId,
    pub customer: CustomerRef,
    pub package_ref: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guests: u32,
    pub amount: Decimal,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub modification_request: Option<ModificationRequest>,
    pub timeline: Vec<TimelineEntry>,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

impl BookingView {
    /// A cancelled booking that was fully paid needs an explicit refund.
    pub fn refund_due(&self) -> bool {
        self.status == BookingStatus::Cancelled && self.payment_status == PaymentStatus::Paid
    }
}

impl Serialize for Booking {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let state = self.inner.lock();
        let mut row = serializer.serialize_struct("Booking", 6)?;
        row.serialize_field("id", &state.id)?;
        row.serialize_field("customer", &state.customer.name)?;
        row.serialize_field("destination", &state.destination)?;
        row.serialize_field("status", state.status.label())?;
        row.serialize_field("payment_status", state.payment_status.label())?;
        row.serialize_field(
            "amount",
            &state.amount.round_dp(Booking::AMOUNT_PRECISION),
        )?;
        row.end()
    }
}
