// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text layouts of the persisted AEAD blobs.
//!
//! - Encrypted field: `nonce.tag.ciphertext`
//! - Wrapped private key: `salt.nonce.tag.ciphertext`
//!
//! Every part is URL-safe base64 with padding. ring appends the tag to the
//! ciphertext; these types split it off and put it back.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use coffer_core::CofferError;

use crate::crypto::{NONCE_SIZE, TAG_LEN};

/// Part separator.
pub const SEPARATOR: char = '.';

/// An AES-256-GCM output split into its stored parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedParts {
    pub nonce: [u8; NONCE_SIZE],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl SealedParts {
    /// Split ring's `ciphertext || tag` output.
    pub fn from_sealed(mut sealed: Vec<u8>, nonce: [u8; NONCE_SIZE]) -> Result<Self, CofferError> {
        if sealed.len() < TAG_LEN {
            return Err(CofferError::Internal(
                "sealed output shorter than the GCM tag".to_string(),
            ));
        }
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&sealed[sealed.len() - TAG_LEN..]);
        sealed.truncate(sealed.len() - TAG_LEN);
        Ok(Self {
            nonce,
            tag,
            ciphertext: sealed,
        })
    }

    /// Rejoin as `ciphertext || tag` for [`crate::crypto::open`].
    pub fn to_sealed(&self) -> Vec<u8> {
        let mut sealed = Vec::with_capacity(self.ciphertext.len() + TAG_LEN);
        sealed.extend_from_slice(&self.ciphertext);
        sealed.extend_from_slice(&self.tag);
        sealed
    }

    fn from_raw(nonce: Vec<u8>, tag: Vec<u8>, ciphertext: Vec<u8>) -> Result<Self, CofferError> {
        let nonce: [u8; NONCE_SIZE] = nonce.try_into().map_err(|n: Vec<u8>| {
            CofferError::MalformedBlob(format!(
                "nonce is {} bytes, expected {NONCE_SIZE}",
                n.len()
            ))
        })?;
        let tag: [u8; TAG_LEN] = tag.try_into().map_err(|t: Vec<u8>| {
            CofferError::MalformedBlob(format!("tag is {} bytes, expected {TAG_LEN}", t.len()))
        })?;
        Ok(Self {
            nonce,
            tag,
            ciphertext,
        })
    }
}

/// Encode an encrypted field as `nonce.tag.ciphertext`.
pub fn encode_field(parts: &SealedParts) -> String {
    join_parts(&[&parts.nonce, &parts.tag, &parts.ciphertext])
}

/// Parse `nonce.tag.ciphertext`.
pub fn decode_field(blob: &str) -> Result<SealedParts, CofferError> {
    let [nonce, tag, ciphertext] = split_parts::<3>(blob, "encrypted field")?;
    SealedParts::from_raw(nonce, tag, ciphertext)
}

/// A private key sealed under a password-derived key, with its KDF salt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedKeyBlob {
    pub salt: Vec<u8>,
    pub sealed: SealedParts,
}

impl WrappedKeyBlob {
    /// Encode as `salt.nonce.tag.ciphertext`.
    pub fn encode(&self) -> String {
        join_parts(&[
            &self.salt,
            &self.sealed.nonce,
            &self.sealed.tag,
            &self.sealed.ciphertext,
        ])
    }

    /// Parse `salt.nonce.tag.ciphertext`.
    pub fn decode(blob: &str) -> Result<Self, CofferError> {
        let [salt, nonce, tag, ciphertext] = split_parts::<4>(blob, "wrapped private key")?;
        Ok(Self {
            salt,
            sealed: SealedParts::from_raw(nonce, tag, ciphertext)?,
        })
    }
}

/// URL-safe base64 of a single binary value.
pub fn encode_b64(bytes: &[u8]) -> String {
    URL_SAFE.encode(bytes)
}

pub fn decode_b64(text: &str, what: &str) -> Result<Vec<u8>, CofferError> {
    URL_SAFE
        .decode(text)
        .map_err(|e| CofferError::MalformedBlob(format!("{what} is not valid base64: {e}")))
}

fn join_parts(parts: &[&[u8]]) -> String {
    parts
        .iter()
        .map(|p| URL_SAFE.encode(p))
        .collect::<Vec<_>>()
        .join(&SEPARATOR.to_string())
}

fn split_parts<const N: usize>(blob: &str, what: &str) -> Result<[Vec<u8>; N], CofferError> {
    let pieces: Vec<&str> = blob.split(SEPARATOR).collect();
    if pieces.len() != N {
        return Err(CofferError::MalformedBlob(format!(
            "{what} has {} parts, expected {N}",
            pieces.len()
        )));
    }

    let decoded = pieces
        .iter()
        .map(|piece| decode_b64(piece, what))
        .collect::<Result<Vec<_>, _>>()?;
    decoded
        .try_into()
        .map_err(|_| CofferError::Internal("part count changed while decoding".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SealedParts {
        SealedParts {
            nonce: [1u8; NONCE_SIZE],
            tag: [2u8; TAG_LEN],
            ciphertext: vec![3, 4, 5, 250, 251],
        }
    }

    #[test]
    fn field_layout_has_three_padded_parts() {
        let encoded = encode_field(&sample());
        let parts: Vec<&str> = encoded.split('.').collect();
        assert_eq!(parts.len(), 3);
        // 12 and 16 bytes encode to 16 and 24 characters.
        assert_eq!(parts[0].len(), 16);
        assert_eq!(parts[1], "AgICAgICAgICAgICAgICAg==");
        assert_eq!(decode_field(&encoded).unwrap(), sample());
    }

    #[test]
    fn sealed_split_and_rejoin() {
        let mut sealed = vec![9u8; 5];
        sealed.extend_from_slice(&[8u8; TAG_LEN]);
        let parts = SealedParts::from_sealed(sealed.clone(), [0u8; NONCE_SIZE]).unwrap();
        assert_eq!(parts.ciphertext, vec![9u8; 5]);
        assert_eq!(parts.tag, [8u8; TAG_LEN]);
        assert_eq!(parts.to_sealed(), sealed);
    }

    #[test]
    fn wrong_part_count_is_malformed() {
        for blob in ["", "abc", "a.b", "a.b.c.d"] {
            let err = decode_field(blob).unwrap_err();
            assert!(matches!(err, CofferError::MalformedBlob(_)), "{blob}");
        }
        assert!(matches!(
            WrappedKeyBlob::decode("a.b.c"),
            Err(CofferError::MalformedBlob(_))
        ));
    }

    #[test]
    fn bad_base64_is_malformed() {
        let err = decode_field("!!!.AAAA.AAAA").unwrap_err();
        assert!(err.to_string().contains("base64"));
    }

    #[test]
    fn wrong_nonce_length_is_malformed() {
        let blob = join_parts(&[&[0u8; 8], &[0u8; TAG_LEN], b"ct"]);
        let err = decode_field(&blob).unwrap_err();
        assert!(err.to_string().contains("nonce is 8 bytes"));
    }

    #[test]
    fn wrapped_key_layout_roundtrip() {
        let blob = WrappedKeyBlob {
            salt: vec![7u8; 16],
            sealed: sample(),
        };
        let encoded = blob.encode();
        assert_eq!(encoded.matches('.').count(), 3);
        assert_eq!(WrappedKeyBlob::decode(&encoded).unwrap(), blob);
    }
}
