//! Utility modules shared across layers.

pub mod record_codec;
