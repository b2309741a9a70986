//! API endpoint handlers.
//!
//! Handlers are thin: decode and validate the request, hand the work to the
//! pipeline, serialize the result.

pub mod expenses;
pub mod gst;
pub mod health;
pub mod receipts;
