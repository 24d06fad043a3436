//! API endpoint integration tests
//!
//! Drives the fully wired router (cache, contract, logging, manager and the
//! in-memory store) through `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

mod common;
mod conversations;
mod messages;
