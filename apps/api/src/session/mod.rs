// Session / identity layer.
// A deliberately thin, local-only identity check gating access to generation.
// No server-side verification beyond key/value lookups; not a security boundary.

pub mod auth;
pub mod client;
pub mod handlers;
pub mod store;
