//! Domain types and rules for Conversations

pub mod entities;
pub mod thread;
pub mod timestamps;
pub mod validation;
