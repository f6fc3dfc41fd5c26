/*!
This module defines the primary error type for the `arisr-proto` crate.

The `Error` enum enumerates the named protocol-violation kinds, plus the
`Generic` catch-all for anything that isn't one of them (a null/empty
buffer, a length that doesn't divide evenly, an underlying AES failure).
*/

use thiserror::Error;

/// The primary error type for the `arisr-proto` crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Null argument, allocation failure, or any precondition that isn't a
    /// named protocol violation.
    #[error("generic protocol error: {0}")]
    Generic(&'static str),

    /// Leading `id` does not match the caller-supplied expected id.
    #[error("leading id does not match expected id")]
    NotSameId,

    /// The `aris` tag failed to decrypt to something usable.
    #[error("aris tag decryption failed")]
    NotSameAris,

    /// Computed header CRC does not match the stored header CRC.
    #[error("header CRC mismatch")]
    NotSameCrcHeader,

    /// Computed data CRC does not match the stored data CRC.
    #[error("data CRC mismatch")]
    NotSameCrcData,

    /// Trailing `end` does not match the expected id.
    #[error("trailing end does not match expected id")]
    NotSameEnd,

    /// (builder) `origin` is all-zero.
    #[error("origin address must not be all-zero")]
    NullOrigin,

    /// (builder) `destinationA` is all-zero.
    #[error("primary destination address must not be all-zero")]
    NullDestination,
}
