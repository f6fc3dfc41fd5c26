/*!
The bitfield codec. A `ctrl1`/`ctrl2` control word is treated as one
32-bit big-endian unsigned integer; each named field is extracted as
`(word & mask) >> shift` and packed as `word |= (value << shift)`.

The setter does **not** clear its target bits first: callers must zero
the control word before the first `set` on it, or the result is
undefined. `Ctrl1::to_bytes`/`Ctrl2::to_bytes` honor that by always
starting from a freshly zeroed word before packing each field.
*/

use crate::constants::{ctrl1, ctrl2, FieldSpec};

/// Reads one field of a 4-byte big-endian control word.
///
/// Assembles `ctrl` MSB-first into a 32-bit word, masks, and shifts down to
/// the field's low bits.
pub fn get(ctrl: &[u8; 4], field: FieldSpec) -> u32 {
    let word = u32::from_be_bytes(*ctrl);
    (word & field.mask) >> field.shift
}

/// Packs `value` into one field of a 4-byte big-endian control word.
///
/// Precondition: the bits covered by `field.mask` in `ctrl` are already
/// zero. Two successive calls targeting the same field without
/// intervening zeroing produce an undefined result.
pub fn set(ctrl: &mut [u8; 4], field: FieldSpec, value: u32) {
    let mut word = u32::from_be_bytes(*ctrl);
    word |= (value << field.shift) & field.mask;
    *ctrl = word.to_be_bytes();
}

/// Unpacked view of the mandatory `ctrl1` control word.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ctrl1 {
    pub version: u8,
    pub destinations: u8,
    pub from: bool,
    pub option: u8,
    pub sequence: u8,
    pub retry: u8,
    pub more_data: bool,
    pub identifier: u8,
    pub more_header: bool,
}

impl Ctrl1 {
    /// Unpacks every field out of the raw 4-byte big-endian word.
    pub fn from_bytes(raw: &[u8; 4]) -> Self {
        Self {
            version: get(raw, ctrl1::VERSION) as u8,
            destinations: get(raw, ctrl1::DESTINATIONS) as u8,
            from: get(raw, ctrl1::FROM) != 0,
            option: get(raw, ctrl1::OPTION) as u8,
            sequence: get(raw, ctrl1::SEQUENCE) as u8,
            retry: get(raw, ctrl1::RETRY) as u8,
            more_data: get(raw, ctrl1::MORE_DATA) != 0,
            identifier: get(raw, ctrl1::IDENTIFIER) as u8,
            more_header: get(raw, ctrl1::MORE_HEADER) != 0,
        }
    }

    /// Packs every field into a fresh (zeroed) 4-byte big-endian word.
    pub fn to_bytes(self) -> [u8; 4] {
        let mut raw = [0u8; 4];
        set(&mut raw, ctrl1::VERSION, self.version as u32);
        set(&mut raw, ctrl1::DESTINATIONS, self.destinations as u32);
        set(&mut raw, ctrl1::FROM, self.from as u32);
        set(&mut raw, ctrl1::OPTION, self.option as u32);
        set(&mut raw, ctrl1::SEQUENCE, self.sequence as u32);
        set(&mut raw, ctrl1::RETRY, self.retry as u32);
        set(&mut raw, ctrl1::MORE_DATA, self.more_data as u32);
        set(&mut raw, ctrl1::IDENTIFIER, self.identifier as u32);
        set(&mut raw, ctrl1::MORE_HEADER, self.more_header as u32);
        raw
    }
}

/// Unpacked view of the optional `ctrl2` control word.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ctrl2 {
    /// On parse, this is the *plaintext* byte length of `data`, which can
    /// differ from the on-wire ciphertext length. On build, it is
    /// populated from the ciphertext length divided by `DATA_MULT` just
    /// before emission.
    pub data_length: u64,
    pub feature: u8,
    pub neg_answer: bool,
    pub freq_switch: bool,
}

impl Ctrl2 {
    /// Unpacks every field out of the raw 4-byte big-endian word.
    ///
    /// `data_length` is multiplied by `DATA_MULT` to yield the on-wire
    /// ciphertext length.
    pub fn from_bytes(raw: &[u8; 4]) -> Self {
        Self {
            data_length: get(raw, ctrl2::DATA_LENGTH) as u64 * crate::constants::DATA_MULT,
            feature: get(raw, ctrl2::FEATURE) as u8,
            neg_answer: get(raw, ctrl2::NEG_ANSWER) != 0,
            freq_switch: get(raw, ctrl2::FREQ_SWITCH) != 0,
        }
    }

    /// Packs every field into a fresh (zeroed) 4-byte big-endian word.
    ///
    /// `wire_data_length` is the *ciphertext* byte count; it is divided by
    /// `DATA_MULT` before being packed.
    pub fn to_bytes(self, wire_data_length: u64) -> [u8; 4] {
        let mut raw = [0u8; 4];
        set(
            &mut raw,
            ctrl2::DATA_LENGTH,
            (wire_data_length / crate::constants::DATA_MULT) as u32,
        );
        set(&mut raw, ctrl2::FEATURE, self.feature as u32);
        set(&mut raw, ctrl2::NEG_ANSWER, self.neg_answer as u32);
        set(&mut raw, ctrl2::FREQ_SWITCH, self.freq_switch as u32);
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolated_fields_round_trip() {
        let ctrl = Ctrl1 {
            version: 0b11,
            destinations: 0b10101,
            from: true,
            option: 0b101,
            sequence: 0xAB,
            retry: 0b110,
            more_data: true,
            identifier: 0xCD,
            more_header: true,
        };
        let raw = ctrl.to_bytes();
        assert_eq!(Ctrl1::from_bytes(&raw), ctrl);
    }

    #[test]
    fn disjoint_field_pairs_do_not_clobber_each_other() {
        // Every pair of ctrl1 fields with disjoint masks stays isolated.
        let specs = [
            ctrl1::VERSION,
            ctrl1::DESTINATIONS,
            ctrl1::FROM,
            ctrl1::OPTION,
            ctrl1::SEQUENCE,
            ctrl1::RETRY,
            ctrl1::MORE_DATA,
            ctrl1::IDENTIFIER,
            ctrl1::MORE_HEADER,
        ];
        for (i, a) in specs.iter().enumerate() {
            for b in &specs[i + 1..] {
                assert_eq!(a.mask & b.mask, 0, "fields must not overlap");
                let mut raw = [0u8; 4];
                let max_a = a.mask >> a.shift;
                let max_b = b.mask >> b.shift;
                set(&mut raw, *a, max_a);
                set(&mut raw, *b, max_b);
                assert_eq!(get(&raw, *a), max_a);
                assert_eq!(get(&raw, *b), max_b);
            }
        }
    }

    #[test]
    fn ctrl2_data_length_round_trips_through_data_mult() {
        let wire_len = 16 * 9;
        let raw = Ctrl2 {
            data_length: 0,
            feature: 0x5A,
            neg_answer: true,
            freq_switch: false,
        }
        .to_bytes(wire_len);
        let ctrl2 = Ctrl2::from_bytes(&raw);
        assert_eq!(ctrl2.data_length, wire_len);
        assert_eq!(ctrl2.feature, 0x5A);
        assert!(ctrl2.neg_answer);
        assert!(!ctrl2.freq_switch);
    }
}
