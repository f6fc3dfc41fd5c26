/*!
The parser. A single linear pass over an untrusted byte buffer,
cursor-driven: `recv` slices the wire layout into a [`RawFrame`] and
validates everything that doesn't need a key, `unpack` unpacks the bit
fields and decrypts `aris`/`data` out of that raw frame — grounded on
`hardy-bpv7/src/bundle/parse.rs`'s cursor-advancing, fail-fast field-by-
field decode and `hardy-bpv7/src/block.rs::BlockWithNumber::from_cbor`'s
pattern of reading a fixed prefix, then a variable-length middle section
sized by an earlier field, then a trailing CRC.

`parse()` is `recv()` followed by `unpack()`; the two-step decomposition
is always compiled and only its public re-export is gated behind the
`partial-functions` feature, so there is exactly one implementation of
the framing logic instead of two copies that can drift apart.
*/

use crate::aes::{self, Key};
use crate::bitfield::{Ctrl1, Ctrl2};
use crate::constants::{ADDRESS_SIZE, PROTO_CRYPT_SIZE};
use crate::crc::crc16;
use crate::error::Error;
use crate::frame::{DecodedFrame, RawFrame};

/// Parses `bytes` into a [`DecodedFrame`].
///
/// Validates, in order: the leading `id` against `expected_id`, the
/// header CRC, the data CRC (if a payload is present), and the trailing
/// `end` against `expected_id` (all in [`recv`]), then decrypts the
/// `aris` tag and the payload (in [`unpack`]).
pub fn parse(bytes: &[u8], key: Option<&Key>, expected_id: [u8; 4]) -> Result<DecodedFrame, Error> {
    let raw = partial::recv(bytes, expected_id)?;
    partial::unpack(&raw, key)
}

/// Slices `len` bytes out of `bytes` starting at `start`, or fails with
/// [`Error::Generic`] if the buffer is too short — every named failure
/// kind is reserved for a specific protocol check, so a short/truncated
/// buffer gets the generic catch-all instead.
fn slice(bytes: &[u8], start: usize, len: usize) -> Result<&[u8], Error> {
    bytes
        .get(start..start + len)
        .ok_or(Error::Generic("buffer truncated"))
}

mod partial {
    use super::*;

    /// `recv`: structural framing only. Slices the byte buffer into
    /// sections using the still-packed control words, and validates
    /// everything that doesn't need a key: [`Error::NotSameId`],
    /// [`Error::NotSameCrcHeader`], [`Error::NotSameCrcData`],
    /// [`Error::NotSameEnd`]. The `aris` tag is left encrypted for
    /// [`unpack`] to handle, so `NotSameAris` can't surface here.
    pub fn recv(bytes: &[u8], expected_id: [u8; 4]) -> Result<RawFrame, Error> {
        if bytes.len() < PROTO_CRYPT_SIZE {
            return Err(Error::Generic("buffer shorter than id + aris"));
        }
        let id: [u8; 4] = slice(bytes, 0, 4)?.try_into().unwrap();
        if id != expected_id {
            return Err(Error::NotSameId);
        }
        let aris: [u8; 4] = slice(bytes, 4, 4)?.try_into().unwrap();

        let mut p = 8usize;
        let ctrl1_raw: [u8; 4] = slice(bytes, p, 4)?.try_into().unwrap();
        p += 4;
        let ctrl = Ctrl1::from_bytes(&ctrl1_raw);

        let origin: [u8; 6] = slice(bytes, p, ADDRESS_SIZE)?.try_into().unwrap();
        p += ADDRESS_SIZE;
        let destination_a: [u8; 6] = slice(bytes, p, ADDRESS_SIZE)?.try_into().unwrap();
        p += ADDRESS_SIZE;

        let mut destinations_b = Vec::with_capacity(ctrl.destinations as usize);
        for _ in 0..ctrl.destinations {
            destinations_b.push(slice(bytes, p, ADDRESS_SIZE)?.try_into().unwrap());
            p += ADDRESS_SIZE;
        }

        let mut destination_c = None;
        if ctrl.from {
            destination_c = Some(slice(bytes, p, ADDRESS_SIZE)?.try_into().unwrap());
            p += ADDRESS_SIZE;
        }

        let mut ctrl2_raw = None;
        let mut ctrl2_fields = Ctrl2::default();
        if ctrl.more_header {
            let raw: [u8; 4] = slice(bytes, p, 4)?.try_into().unwrap();
            p += 4;
            ctrl2_fields = Ctrl2::from_bytes(&raw);
            ctrl2_raw = Some(raw);
        }

        let header_end = p;
        let crc_header: [u8; 2] = slice(bytes, p, 2)?.try_into().unwrap();
        p += 2;
        if crc16(&bytes[0..header_end]) != u16::from_be_bytes(crc_header) {
            return Err(Error::NotSameCrcHeader);
        }

        let mut data = Vec::new();
        let mut crc_data = None;
        if ctrl.more_header && ctrl2_fields.data_length > 0 {
            let wire_len = ctrl2_fields.data_length as usize;
            let ciphertext = slice(bytes, p, wire_len)?;
            let computed = crc16(ciphertext);
            data = ciphertext.to_vec();
            p += wire_len;

            let tag: [u8; 2] = slice(bytes, p, 2)?.try_into().unwrap();
            p += 2;
            if computed != u16::from_be_bytes(tag) {
                return Err(Error::NotSameCrcData);
            }
            crc_data = Some(tag);
        }

        let end: [u8; 4] = slice(bytes, p, 4)?.try_into().unwrap();
        if end != expected_id {
            return Err(Error::NotSameEnd);
        }

        Ok(RawFrame {
            id,
            aris,
            ctrl1: ctrl1_raw,
            origin,
            destination_a,
            destinations_b,
            destination_c,
            ctrl2: ctrl2_raw,
            crc_header,
            data,
            crc_data,
            end,
        })
    }

    /// `unpack`: unpacks the bit fields and decrypts `aris`/`data` out of
    /// a [`RawFrame`] previously produced by [`recv`].
    pub fn unpack(raw: &RawFrame, key: Option<&Key>) -> Result<DecodedFrame, Error> {
        let mut aris = raw.aris;
        aes::aris_decrypt(&mut aris, key).map_err(|_| Error::NotSameAris)?;

        let ctrl = Ctrl1::from_bytes(&raw.ctrl1);
        let mut ctrl2 = raw.ctrl2.map(|c| Ctrl2::from_bytes(&c)).unwrap_or_default();

        let data = if let Some(ciphertext) = (!raw.data.is_empty()).then_some(&raw.data) {
            let plaintext = aes::data_decrypt(ciphertext, key)
                .map_err(|_| Error::Generic("data decryption failed"))?;
            ctrl2.data_length = plaintext.len() as u64;
            plaintext
        } else {
            Vec::new()
        };

        Ok(DecodedFrame {
            id: raw.id,
            aris,
            ctrl,
            ctrl2,
            origin: raw.origin,
            destination_a: raw.destination_a,
            destinations_b: raw.destinations_b.clone(),
            destination_c: raw.destination_c.unwrap_or_default(),
            data,
            crc_header: raw.crc_header,
            crc_data: raw.crc_data.unwrap_or_default(),
            end: raw.end,
        })
    }
}

#[cfg(feature = "partial-functions")]
pub use partial::{recv, unpack};
