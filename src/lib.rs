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

//! # Booking Engine
//!
//! This library provides the booking lifecycle core for a travel agency:
//! confirmations, cancellations, payment tracking, and the customer
//! modification-request workflow, with an append-only audit timeline per
//! booking.
//!
//! ## Core Components
//!
//! - [`Engine`]: Central store and the only mutation surface for bookings
//! - [`Booking`]: Booking record with status, payment, and audit state
//! - [`BookingAction`]: Supported mutations (confirm, cancel, payment, ...)
//! - [`BookingError`]: Error types for rejected operations
//!
//! ## Example
//!
//! ```
//! use booking_engine_rs::{Actor, BookingStatus, Engine, NewBooking};
//!
//! let engine = Engine::new();
//!
//! // Register a booking; it starts pending with payment pending
//! let booking = engine
//!     .create(NewBooking::sample("B-1001"), Actor::Customer)
//!     .unwrap();
//! assert_eq!(booking.status, BookingStatus::Pending);
//!
//! // An admin confirms it
//! let confirmed = engine.confirm(&booking.id, Actor::Admin).unwrap();
//! assert_eq!(confirmed.status, BookingStatus::Confirmed);
//! assert_eq!(confirmed.timeline.len(), 2);
//! ```
//!
//! ## Thread Safety
//!
//! The engine handles concurrent access to bookings, allowing admin
//! sessions and the booking-creation path to operate in parallel on
//! different records while writers to one record stay serialized.

pub mod booking;
mod base;
mod engine;
pub mod error;
mod event;
mod query;
mod request;
mod timeline;

pub use base::{Actor, BookingId};
pub use booking::{
    Booking, BookingAction, BookingStatus, BookingView, CustomerRef, NewBooking, PaymentStatus,
};
pub use engine::Engine;
pub use error::BookingError;
pub use event::{BookingEvent, BookingEventKind, EventBus, HandlerResult};
pub use query::{SearchCriteria, SortKey};
pub use request::{ApprovalChanges, ModificationKind, ModificationRequest, ModificationStatus};
pub use timeline::{Message, TimelineEntry};
