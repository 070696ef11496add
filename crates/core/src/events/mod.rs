// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event distribution
//!
//! This module provides:
//! - `EventBus` - Route events to matching subscribers
//! - `EventFilter` - Name patterns, categories, severity and predicates
//! - `EventPattern` - Dotted-name pattern matching for subscriptions

mod bus;
mod subscription;

pub use bus::{
    BusDeliveryError, BusError, BusSettings, DispatchReport, EventBus, EventHandler,
    EventReceiver, EventSender, HandlerError,
};
pub use subscription::{EventFilter, EventPattern, Predicate, SubscriberId, Subscription};
