//! Pipeline stages shared by the three document handlers.
//!
//! Each submodule implements exactly one step; the handlers in
//! [`crate::handler`] wire them together. Keeping stages separate makes
//! each independently testable and keeps the format-specific work confined
//! to [`crate::extract`].
//!
//! ## Data Flow
//!
//! ```text
//! event ──▶ fetch ──▶ extract ──▶ publish
//! (decoded) (storage)  (format)   (derived keys)
//! ```
//!
//! 1. [`fetch`]   — pull the source bucket and decoded key out of the
//!    notification and buffer the whole document
//! 2. [`crate::extract`] — format-specific text + image extraction; runs in
//!    `spawn_blocking` because parsing is CPU-bound
//! 3. [`publish`] — derive destination keys from the source key and write
//!    the text object plus each image sequentially

pub mod fetch;
pub mod publish;
