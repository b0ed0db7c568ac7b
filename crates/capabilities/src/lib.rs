//! External capability contracts and their HTTP adapters.
//!
//! Everything the pipeline and lifecycle controller need from the
//! outside world comes through the traits in [`traits`]: geocoding,
//! chart mathematics, LLM generation, payment verification/refunds,
//! and report delivery. The adapters here are deliberately thin; the
//! interesting logic (what to do when a capability fails) lives with
//! the callers.

pub mod chart;
pub mod google;
pub mod nominatim;
pub mod razorpay;
pub mod report;
pub mod resend;
pub mod traits;

pub use traits::{
    ChartEngine, DeliveryChannel, GeocodingProvider, LlmProvider, LlmRequest, PaymentEvent,
    PaymentGateway,
};
