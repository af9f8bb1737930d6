//! Application layer: code allocation policy and the service used by handlers.
//!
//! - [`allocator::CodeAllocator`] - Custom code checks, generated codes, sequence codes
//! - [`services::link_service::LinkService`] - Shorten, resolve and stats operations

pub mod allocator;
pub mod services;
