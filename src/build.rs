/*!
The builder. Two phases — pack bit fields and encrypt the payload into a
[`RawFrame`] (`pack`), then linearize that raw frame into bytes with both
CRCs computed (`send`) — grounded on `hardy-bpv7/src/builder.rs`'s
size-then-emit structure and `hardy-bpv7/src/block.rs::Block::emit`'s
"zero a scratch, emit fields, patch the CRC in afterwards" idiom.

`build()` is `pack()` followed by `send()`; the two-step decomposition is
always compiled (mirroring `recv`/`unpack` in `parse.rs`) and only its
public re-export is gated behind the `partial-functions` feature, so
there is exactly one implementation of the framing logic to keep in sync
with the parser.
*/

use crate::aes::{self, Key};
use crate::bitfield::{Ctrl1, Ctrl2};
use crate::constants::{ctrl1 as ctrl1_fields, ADDRESS_SIZE, DATA_MULT};
use crate::crc::crc16;
use crate::error::Error;
use crate::frame::{DecodedFrame, RawFrame};

/// Serializes `frame` into an owned wire buffer.
///
/// Both CRCs are computed over the freshly emitted bytes and the payload
/// (if any) is encrypted before emission.
pub fn build(frame: &DecodedFrame, key: Option<&Key>) -> Result<Vec<u8>, Error> {
    let raw = partial::pack(frame, key)?;
    partial::send(&raw)
}

mod partial {
    use super::*;

    /// `pack`: packs bit fields and encrypts `aris`/`data`; CRC fields are
    /// left zeroed (`send` computes them).
    ///
    /// The wire `destinations` count is derived from `frame.destinations_b`
    /// itself — never from `frame.ctrl.destinations` — so there is exactly
    /// one source of truth for how many addresses get packed into `ctrl1`
    /// and how many get copied onto the wire.
    pub fn pack(frame: &DecodedFrame, key: Option<&Key>) -> Result<RawFrame, Error> {
        if frame.origin == [0u8; 6] {
            return Err(Error::NullOrigin);
        }
        if frame.destination_a == [0u8; 6] {
            return Err(Error::NullDestination);
        }

        let destinations = frame.destinations_b.len();
        let max_destinations =
            (ctrl1_fields::DESTINATIONS.mask >> ctrl1_fields::DESTINATIONS.shift) as usize;
        if destinations > max_destinations {
            return Err(Error::Generic(
                "destinations_b exceeds the destinations control field's width",
            ));
        }

        let mut aris = frame.aris;
        aes::aris_encrypt(&mut aris, key)
            .map_err(|_| Error::Generic("aris encryption failed"))?;

        let data = if frame.ctrl.more_header && !frame.data.is_empty() {
            let enc = aes::data_encrypt(&frame.data, key)
                .map_err(|_| Error::Generic("data encryption failed"))?;
            if enc.len() as u64 % DATA_MULT != 0 {
                return Err(Error::Generic(
                    "encrypted payload length is not a multiple of DATA_MULT",
                ));
            }
            enc
        } else {
            Vec::new()
        };

        let ctrl1_bytes = Ctrl1 {
            destinations: destinations as u8,
            ..frame.ctrl
        }
        .to_bytes();

        let ctrl2 = frame.ctrl.more_header.then(|| {
            Ctrl2 {
                data_length: 0,
                feature: frame.ctrl2.feature,
                neg_answer: frame.ctrl2.neg_answer,
                freq_switch: frame.ctrl2.freq_switch,
            }
            .to_bytes(data.len() as u64)
        });

        Ok(RawFrame {
            id: frame.id,
            aris,
            ctrl1: ctrl1_bytes,
            origin: frame.origin,
            destination_a: frame.destination_a,
            destinations_b: frame.destinations_b.clone(),
            destination_c: frame.ctrl.from.then_some(frame.destination_c),
            ctrl2,
            crc_header: [0, 0],
            crc_data: (frame.ctrl.more_header && !data.is_empty()).then_some([0, 0]),
            data,
            end: frame.id,
        })
    }

    /// `send`: linearizes a [`RawFrame`] and computes both CRCs.
    ///
    /// The wire shape (destinations count, presence of `destinationC`,
    /// `ctrl2`, and `data`/`crc_data`) is derived entirely from `raw`'s own
    /// fields, so the size computation and the emission loop can never
    /// disagree about how many bytes each section occupies.
    pub fn send(raw: &RawFrame) -> Result<Vec<u8>, Error> {
        let more_header = raw.ctrl2.is_some();
        let from = raw.destination_c.is_some();
        let destinations = raw.destinations_b.len();

        let size = 30
            + 6 * destinations
            + if from { 6 } else { 0 }
            + if more_header {
                4 + raw.data.len() + if raw.data.is_empty() { 0 } else { 2 }
            } else {
                0
            };

        let mut out = vec![0u8; size];
        let mut p = 0usize;

        out[p..p + 4].copy_from_slice(&raw.id);
        p += 4;
        out[p..p + 4].copy_from_slice(&raw.aris);
        p += 4;
        out[p..p + 4].copy_from_slice(&raw.ctrl1);
        p += 4;
        out[p..p + ADDRESS_SIZE].copy_from_slice(&raw.origin);
        p += ADDRESS_SIZE;
        out[p..p + ADDRESS_SIZE].copy_from_slice(&raw.destination_a);
        p += ADDRESS_SIZE;

        for addr in &raw.destinations_b {
            out[p..p + ADDRESS_SIZE].copy_from_slice(addr);
            p += ADDRESS_SIZE;
        }

        if let Some(destination_c) = raw.destination_c {
            out[p..p + ADDRESS_SIZE].copy_from_slice(&destination_c);
            p += ADDRESS_SIZE;
        }

        if let Some(ctrl2) = raw.ctrl2 {
            out[p..p + 4].copy_from_slice(&ctrl2);
            p += 4;
        }

        let header_crc = crc16(&out[0..p]);
        out[p..p + 2].copy_from_slice(&header_crc.to_be_bytes());
        p += 2;

        if !raw.data.is_empty() {
            out[p..p + raw.data.len()].copy_from_slice(&raw.data);
            let data_crc = crc16(&raw.data);
            p += raw.data.len();
            out[p..p + 2].copy_from_slice(&data_crc.to_be_bytes());
            p += 2;
        }

        out[p..p + 4].copy_from_slice(&raw.id);

        Ok(out)
    }
}

#[cfg(feature = "partial-functions")]
pub use partial::{pack, send};

#[cfg(test)]
mod tests {
    use super::*;

    const ID: [u8; 4] = [0x11, 0x22, 0x33, 0x44];

    #[test]
    fn p5_shape_determinism() {
        let mut frame = DecodedFrame {
            id: ID,
            origin: [1; 6],
            destination_a: [2; 6],
            end: ID,
            ..Default::default()
        };
        frame.ctrl.destinations = 4;
        frame.destinations_b = vec![[9; 6]; 4];
        frame.ctrl.from = true;
        frame.destination_c = [8; 6];

        let bytes = build(&frame, None).unwrap();
        let expected = 30 + 6 * 4 + 6;
        assert_eq!(bytes.len(), expected);
    }

    #[test]
    fn p6_optional_sections_absent_when_flags_clear() {
        let frame = DecodedFrame {
            id: ID,
            origin: [1; 6],
            destination_a: [2; 6],
            end: ID,
            ..Default::default()
        };
        let bytes = build(&frame, None).unwrap();
        // No destinationC, no ctrl2, no data, no crc_data: exactly the
        // 30-byte base shape.
        assert_eq!(bytes.len(), 30);
    }

    #[test]
    fn rejects_null_origin() {
        let frame = DecodedFrame {
            id: ID,
            origin: [0; 6],
            destination_a: [2; 6],
            end: ID,
            ..Default::default()
        };
        assert!(matches!(build(&frame, None), Err(Error::NullOrigin)));
    }

    #[test]
    fn rejects_null_destination() {
        let frame = DecodedFrame {
            id: ID,
            origin: [1; 6],
            destination_a: [0; 6],
            end: ID,
            ..Default::default()
        };
        assert!(matches!(build(&frame, None), Err(Error::NullDestination)));
    }

    #[test]
    fn destinations_count_is_derived_from_the_vec_not_the_ctrl_field() {
        // ctrl.destinations disagrees with destinations_b.len(); the Vec
        // wins, and the emitted frame round-trips on that basis.
        let mut frame = DecodedFrame {
            id: ID,
            origin: [1; 6],
            destination_a: [2; 6],
            end: ID,
            ..Default::default()
        };
        frame.ctrl.destinations = 1;
        frame.destinations_b = vec![[3; 6], [4; 6], [5; 6]];

        let bytes = build(&frame, None).unwrap();
        assert_eq!(bytes.len(), 30 + 6 * 3);

        let parsed = crate::parse::parse(&bytes, None, ID).unwrap();
        assert_eq!(parsed.ctrl.destinations, 3);
        assert_eq!(parsed.destinations_b, frame.destinations_b);
    }

    #[test]
    fn rejects_destinations_b_wider_than_the_control_field() {
        let mut frame = DecodedFrame {
            id: ID,
            origin: [1; 6],
            destination_a: [2; 6],
            end: ID,
            ..Default::default()
        };
        frame.destinations_b = vec![[1; 6]; 32];
        assert!(matches!(build(&frame, None), Err(Error::Generic(_))));
    }
}
