//! `arisr-proto`: a binary framing codec for the ARISR link-layer protocol.
//!
//! This crate parses and builds ARISR frames: a fixed leading identifier
//! and obfuscated tag, a packed 32-bit control word, one to three
//! addresses, an optional second control word gating a CRC-protected,
//! AES-encrypted payload, and a trailing identifier repeat. See
//! [`parse::parse`] and [`build::build`] for the two entry points most
//! callers need.
//!
//! Enabling the `partial-functions` feature additionally exposes
//! [`parse::recv`]/[`parse::unpack`] and [`build::pack`]/[`build::send`],
//! which split `parse`/`build` into a structural framing half and a
//! bitfield/crypto half, for callers that want to inspect a frame's shape
//! before committing to a key.
//!
//! This crate never logs: frames and keys pass through untouched, and any
//! observability belongs to the caller.

pub mod aes;
pub mod bitfield;
pub mod build;
pub mod constants;
pub mod crc;
pub mod error;
pub mod frame;
pub mod parse;

pub use build::build;
pub use error::Error;
pub use frame::{DecodedFrame, RawFrame};
pub use parse::parse;

#[cfg(feature = "partial-functions")]
pub use build::{pack, send};
#[cfg(feature = "partial-functions")]
pub use parse::{recv, unpack};
