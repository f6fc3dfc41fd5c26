/*!
The raw and decoded frame models, and their cleanup methods.

Grounded on `hardy-bpv7`'s `block::Block`/`block::Payload` split between a
borrowed-vs-owned payload and a typed owner of its sub-regions — here
generalized to a whole frame. Ownership is explicit, with no shared
pointers between the two: [`RawFrame`] owns its variable-length sections
as they travel the wire (still-packed control words, still-encrypted
payload); [`DecodedFrame`] owns the fully unpacked, decrypted view.

Cleanup is handled two ways at once: scope-exit zeroing via
`ZeroizeOnDrop`, and an explicit, idempotent `clean`/`raw_clean` method
for callers that want deterministic early release.
*/

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::bitfield::{Ctrl1, Ctrl2};

/// Intermediate, still-packed view of a frame: control words are raw
/// bytes, the payload (if present) is still ciphertext. Produced by
/// [`crate::parse::recv`], consumed by [`crate::parse::unpack`]; produced
/// by [`crate::build::pack`], consumed by [`crate::build::send`].
#[derive(Debug, Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct RawFrame {
    pub id: [u8; 4],
    pub aris: [u8; 4],
    pub ctrl1: [u8; 4],
    pub origin: [u8; 6],
    pub destination_a: [u8; 6],
    pub destinations_b: Vec<[u8; 6]>,
    pub destination_c: Option<[u8; 6]>,
    pub ctrl2: Option<[u8; 4]>,
    pub crc_header: [u8; 2],
    /// Ciphertext payload bytes, present iff `more_header` and
    /// `data_length > 0`.
    pub data: Vec<u8>,
    pub crc_data: Option<[u8; 2]>,
    pub end: [u8; 4],
}

impl RawFrame {
    /// Releases all owned sub-buffers and zeroes the shell.
    ///
    /// Calling this on an already-empty frame is a no-op.
    pub fn raw_clean(&mut self) {
        self.zeroize();
        self.destinations_b = Vec::new();
        self.destination_c = None;
        self.ctrl2 = None;
        self.data = Vec::new();
        self.crc_data = None;
    }
}

/// Fully-parsed, decrypted view of a frame, suitable for application
/// consumption.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodedFrame {
    pub id: [u8; 4],
    /// The decrypted `aris` tag. Not compared against
    /// [`crate::constants::PROTO_ARIS_TEXT`] by this crate; a mismatch
    /// there is caught indirectly by the header CRC check instead, since
    /// `aris` wire bytes fall inside the header CRC window.
    pub aris: [u8; 4],
    pub ctrl: Ctrl1,
    /// All-zero when `ctrl.more_header == false`.
    pub ctrl2: Ctrl2,
    pub origin: [u8; 6],
    pub destination_a: [u8; 6],
    /// Length always equals `ctrl.destinations`.
    pub destinations_b: Vec<[u8; 6]>,
    /// All-zero when `ctrl.from == false`.
    pub destination_c: [u8; 6],
    /// Plaintext payload. Empty when `ctrl.more_header == false`.
    pub data: Vec<u8>,
    pub crc_header: [u8; 2],
    pub crc_data: [u8; 2],
    pub end: [u8; 4],
}

impl Zeroize for DecodedFrame {
    fn zeroize(&mut self) {
        self.id.zeroize();
        self.aris.zeroize();
        self.origin.zeroize();
        self.destination_a.zeroize();
        self.destinations_b.clear();
        self.destination_c.zeroize();
        self.data.zeroize();
        self.crc_header.zeroize();
        self.crc_data.zeroize();
        self.end.zeroize();
        self.ctrl = Ctrl1::default();
        self.ctrl2 = Ctrl2::default();
    }
}

impl ZeroizeOnDrop for DecodedFrame {}

impl Drop for DecodedFrame {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl DecodedFrame {
    /// Releases the owned `destinationsB`/`data` sequences and zeroes the
    /// shell. Calling this on an already-empty frame is a no-op.
    pub fn clean(&mut self) {
        self.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_is_idempotent() {
        let mut frame = DecodedFrame {
            id: [1, 2, 3, 4],
            data: vec![9u8; 8],
            destinations_b: vec![[1u8; 6]],
            ..Default::default()
        };
        frame.clean();
        assert_eq!(frame, DecodedFrame::default());
        frame.clean();
        assert_eq!(frame, DecodedFrame::default());
    }

    #[test]
    fn raw_clean_is_idempotent_and_clears_owned_sections() {
        let mut raw = RawFrame {
            id: [1, 2, 3, 4],
            data: vec![1u8; 4],
            destinations_b: vec![[2u8; 6]],
            destination_c: Some([3u8; 6]),
            ctrl2: Some([4u8; 4]),
            crc_data: Some([5, 6]),
            ..Default::default()
        };
        raw.raw_clean();
        assert_eq!(raw.id, [0u8; 4]);
        assert!(raw.destinations_b.is_empty());
        assert!(raw.destination_c.is_none());
        assert!(raw.ctrl2.is_none());
        assert!(raw.data.is_empty());
        assert!(raw.crc_data.is_none());
        raw.raw_clean();
        assert_eq!(raw.id, [0u8; 4]);
    }
}
