/*!
The AES gateways. Treated by the rest of the crate as an opaque pair of
encrypt/decrypt operations keyed by a 16-byte key, with a distinguished
all-zero sentinel key standing in for "no user key".

Two distinct transforms:
- `aris_encrypt`/`aris_decrypt`: an in-place, length-preserving transform
  of the 4-byte `aris` tag. Implemented as AES-128-CTR keystream XOR, which
  is naturally symmetric and needs no block-size padding.
- `data_encrypt`/`data_decrypt`: a transform of the variable-length
  payload that allocates a new buffer and may change length. Implemented
  as AES-128-CBC with PKCS#7 padding, which is why ciphertext can be
  longer than plaintext.

Both use a fixed all-zero IV/counter: the wire format has no slot to carry
a per-frame IV, and IV/nonce management is left to callers layered on top
of this crate.
*/

use aes::Aes128;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, StreamCipher};

use crate::error::Error;

/// A 16-byte AES-128 key.
pub type Key = [u8; 16];

/// The distinguished "no user key" sentinel.
pub const NULL_KEY: Key = [0u8; 16];

type Aes128Ctr = ctr::Ctr64BE<Aes128>;
type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

const ZERO_IV: [u8; 16] = [0u8; 16];

/// Resolves a caller-supplied key, substituting [`NULL_KEY`] for `None`.
fn resolve(key: Option<&Key>) -> Key {
    key.copied().unwrap_or(NULL_KEY)
}

/// Transforms the 4-byte `aris` tag in place using `key`.
///
/// AES-CTR's keystream XOR is its own inverse, so encrypt and decrypt are
/// the same operation; both are exposed to mirror the protocol's
/// symmetric `aris_encrypt`/`aris_decrypt` naming.
fn aris_xor(buf: &mut [u8; 4], key: Option<&Key>) {
    let key = resolve(key);
    let mut cipher = Aes128Ctr::new((&key).into(), (&ZERO_IV).into());
    cipher.apply_keystream(buf);
}

/// Encrypts the 4-byte `aris` tag in place with `key`.
pub fn aris_encrypt(buf: &mut [u8; 4], key: Option<&Key>) -> Result<(), Error> {
    aris_xor(buf, key);
    Ok(())
}

/// Decrypts the 4-byte `aris` tag in place with `key`.
pub fn aris_decrypt(buf: &mut [u8; 4], key: Option<&Key>) -> Result<(), Error> {
    aris_xor(buf, key);
    Ok(())
}

/// Encrypts `plaintext` with `key`, returning a newly owned ciphertext
/// buffer. The ciphertext is PKCS#7-padded to a whole number of AES
/// blocks, so `out.len()` may exceed `plaintext.len()`.
pub fn data_encrypt(plaintext: &[u8], key: Option<&Key>) -> Result<Vec<u8>, Error> {
    let key = resolve(key);
    let encryptor = Aes128CbcEnc::new((&key).into(), (&ZERO_IV).into());
    Ok(encryptor.encrypt_padded_vec_mut::<cbc::cipher::block_padding::Pkcs7>(plaintext))
}

/// Decrypts `ciphertext` with `key`, returning a newly owned plaintext
/// buffer with PKCS#7 padding removed.
pub fn data_decrypt(ciphertext: &[u8], key: Option<&Key>) -> Result<Vec<u8>, Error> {
    let key = resolve(key);
    let decryptor = Aes128CbcDec::new((&key).into(), (&ZERO_IV).into());
    decryptor
        .decrypt_padded_vec_mut::<cbc::cipher::block_padding::Pkcs7>(ciphertext)
        .map_err(|_| Error::Generic("data decryption failed (bad key or corrupt ciphertext)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aris_tag_round_trips() {
        let key = [0x42u8; 16];
        let mut buf = *b"ARIS";
        aris_encrypt(&mut buf, Some(&key)).unwrap();
        assert_ne!(&buf, b"ARIS");
        aris_decrypt(&mut buf, Some(&key)).unwrap();
        assert_eq!(&buf, b"ARIS");
    }

    #[test]
    fn data_round_trips_and_pads() {
        let key = [0x11u8; 16];
        let plaintext = vec![0xAAu8; 16];
        let ciphertext = data_encrypt(&plaintext, Some(&key)).unwrap();
        // A full block of plaintext still needs a full padding block.
        assert_eq!(ciphertext.len(), 32);
        let decrypted = data_decrypt(&ciphertext, Some(&key)).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn none_key_behaves_like_null_key() {
        let mut a = *b"ARIS";
        let mut b = *b"ARIS";
        aris_encrypt(&mut a, None).unwrap();
        aris_encrypt(&mut b, Some(&NULL_KEY)).unwrap();
        assert_eq!(a, b);
    }
}
