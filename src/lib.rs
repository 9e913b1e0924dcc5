//! Easel - Image generation gateway
//!
//! This library dispatches image-generation requests across an ordered set of
//! providers, retrying transient failures and falling back to lower-priority
//! providers, while tracking each provider's health.

pub mod agent;
pub mod api;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod fallback;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod storage;
