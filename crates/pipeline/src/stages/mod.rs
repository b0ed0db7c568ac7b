//! Stage nodes. Each consumes the conversation state, calls one
//! external capability (the LLM-backed stages also read upstream
//! fields), and writes back exactly one derived field.

pub mod chart;
pub mod chat;
pub mod dasha;
pub mod goals;
pub mod location;
pub mod recommend;
pub mod summarize;
