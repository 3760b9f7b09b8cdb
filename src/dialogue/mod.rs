//! Dialogue module for scripted food ordering
//!
//! Provides an explicit state machine with four states:
//! - Waiting: no order in progress, answers menu/help/greeting requests
//! - AskingProduct: waiting for the product name
//! - AskingQuantity: waiting for a number of units (1..=50)
//! - Confirming: waiting for yes/no on the order summary

mod engine;
pub mod intents;
pub mod normalize;
pub mod random;

pub use engine::{acknowledge_image, handle, PendingOrder, Session, State};

#[cfg(test)]
mod proptests;
