//! # Shared Bus - In-Process Event Transport
//!
//! The reliable, order-preserving local event bus every process publishes on.
//!
//! ## Dispatch Model
//!
//! ```text
//! ┌──────────────┐                    ┌───────────────────┐
//! │  Com (P1)    │    publish()       │  MessageRouter    │
//! │              │ ──────┐            │  payload handler  │
//! └──────────────┘       │            │  token handler    │
//!                        ▼            │                   │
//!                  ┌──────────────┐   └───────────────────┘
//!                  │  Event Bus   │ ─────────┘ one dispatcher
//!                  │              │   thread per subscription
//!                  └──────────────┘
//! ```
//!
//! - Every subscription owns an unbounded FIFO channel, so nothing is lost and
//!   events from one publisher reach each subscriber in publish order.
//! - Handlers run on a dedicated dispatcher thread per subscription; separate
//!   subscriptions are delivered in parallel.
//! - Dropping a [`Subscription`] closes its channel and stops its dispatcher.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::EventFilter;
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventHandler, EventSubscriber, Subscription, SubscriptionError};

/// Name prefix of the dispatcher threads spawned by [`InMemoryEventBus`].
pub const DISPATCHER_THREAD_PREFIX: &str = "bus-dispatch";

/// Both halves of the event bus.
///
/// Components that publish and subscribe take an `Arc<dyn Transport>` so tests
/// can wrap the in-memory bus with recording or fault-injecting decorators.
pub trait Transport: EventPublisher + EventSubscriber {}

impl<T: EventPublisher + EventSubscriber> Transport for T {}
