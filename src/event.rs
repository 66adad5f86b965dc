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

//! Domain events and the notification hand-off.
//!
//! Every successful mutation emits one [`BookingEvent`]. Delivery to
//! subscribers (the notification dispatcher collaborator) is best-effort:
//! a failing handler is logged and never affects the state of record.

use crate::base::{Actor, BookingId};
use crate::booking::PaymentStatus;
use crate::request::ModificationKind;
use crossbeam::queue::SegQueue;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// What happened to a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BookingEventKind {
    Created,
    Confirmed,
    Cancelled {
        /// The booking was fully paid; a refund must be triggered
        /// explicitly by the caller.
        refund_due: bool,
    },
    PaymentMarked {
        status: PaymentStatus,
    },
    ModificationRequested {
        kind: ModificationKind,
    },
    ModificationApproved {
        kind: ModificationKind,
    },
    ModificationDenied {
        kind: ModificationKind,
    },
    MessageAdded {
        sender: Actor,
    },
}

/// A domain event tied to a booking, handed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingEvent {
    pub booking_id: BookingId,
    pub kind: BookingEventKind,
}

/// Result a notification handler reports back. Errors are logged, never
/// propagated.
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

type Handler = Box<dyn Fn(&BookingEvent) -> HandlerResult + Send + Sync>;

/// Fan-out point between the engine and notification delivery.
///
/// Events are pushed onto a [`SegQueue`] and drained FIFO, so emission
/// (inside a record's critical section) is decoupled from delivery
/// (outside it). All operations are safe for concurrent access.
pub struct EventBus {
    handlers: RwLock<Vec<Handler>>,
    pending: SegQueue<BookingEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            pending: SegQueue::new(),
        }
    }

    /// Registers a handler for every subsequent event.
    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&BookingEvent) -> HandlerResult + Send + Sync + 'static,
    {
        self.handlers.write().push(Box::new(handler));
    }

    /// Queues an event and drains the queue to all current subscribers.
    ///
    /// Fire-and-forget: a handler error is logged at `warn` and delivery
    /// continues with the remaining handlers. Retry policy belongs to the
    /// dispatcher collaborator, not here.
    pub fn publish(&self, event: BookingEvent) {
        self.pending.push(event);
        let handlers = self.handlers.read();
        while let Some(event) = self.pending.pop() {
            for handler in handlers.iter() {
                if let Err(error) = handler(&event) {
                    tracing::warn!(
                        booking = %event.booking_id,
                        error = %error,
                        "notification handler failed"
                    );
                }
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
