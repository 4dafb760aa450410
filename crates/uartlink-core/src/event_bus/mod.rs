//! # Event Bus Module
//!
//! Decoupled delivery of [`LinkEvent`]s from the link to whatever renders
//! them. The link only sees the [`EventSink`] trait; the foreground picks the
//! concrete sink.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tokio::sync::mpsc;
//! use uartlink_core::event_bus::{EventSink, LinkEvent};
//!
//! let (tx, mut rx) = mpsc::unbounded_channel();
//! tx.publish(LinkEvent::Transmitted { raw: 0xAA });
//! assert_eq!(rx.try_recv().unwrap().description(), "TX -> 0xAA");
//! ```

mod events;
mod sink;

pub use events::*;
pub use sink::*;
