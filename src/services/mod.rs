//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the dispatch lifecycle and session housekeeping so
//! route handlers can stay focused on form decoding and page rendering.

pub mod sweeper;
pub mod troubleshoot;
