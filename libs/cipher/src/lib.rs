//! Content cipher used by the phone app when end-to-end encryption is enabled.
//!
//! Wire format: standard base64 of `[IV: 16 bytes][AES-256-CFB body]`, where the
//! AES key is the SHA-256 digest of the user's encryption key string.

use std::fmt;
use std::sync::Arc;

use aes::Aes256;
use aes::cipher::{AsyncStreamCipher, Iv, Key, KeyIvInit};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use rand::RngCore;
use sha2::{Digest, Sha256};
use smshook_core::{DecryptError, Decryptor, SharedDecryptor};
use tracing::debug;
use zeroize::Zeroizing;

type Aes256CfbEnc = cfb_mode::Encryptor<Aes256>;
type Aes256CfbDec = cfb_mode::Decryptor<Aes256>;

pub const IV_LEN: usize = 16;

/// Key material supplied by the host at startup.
#[derive(Clone, Default)]
pub struct CipherConfig {
    pub encryption_key: Option<String>,
}

impl fmt::Debug for CipherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherConfig")
            .field(
                "encryption_key",
                &self.encryption_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl CipherConfig {
    /// Builds the decrypt capability. Without a key every decrypt soft-fails.
    pub fn build(&self) -> SharedDecryptor {
        match self
            .encryption_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
        {
            Some(key) => Arc::new(HttpSmsCipher::new(key)),
            None => {
                debug!("no encryption key configured; encrypted messages will stay ciphertext");
                Arc::new(MissingKey)
            }
        }
    }
}

pub struct HttpSmsCipher {
    key: Zeroizing<[u8; 32]>,
}

impl fmt::Debug for HttpSmsCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSmsCipher").finish_non_exhaustive()
    }
}

impl HttpSmsCipher {
    pub fn new(encryption_key: &str) -> Self {
        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&Sha256::digest(encryption_key.as_bytes()));
        Self { key }
    }

    pub fn encrypt(&self, plaintext: &str) -> String {
        let mut iv = [0u8; IV_LEN];
        rand::rng().fill_bytes(&mut iv);
        self.encrypt_with_iv(plaintext, iv)
    }

    fn encrypt_with_iv(&self, plaintext: &str, iv: [u8; IV_LEN]) -> String {
        let mut body = plaintext.as_bytes().to_vec();
        let key = Key::<Aes256CfbEnc>::from_slice(&self.key[..]);
        Aes256CfbEnc::new(key, Iv::<Aes256CfbEnc>::from_slice(&iv)).encrypt(&mut body);

        let mut out = Vec::with_capacity(IV_LEN + body.len());
        out.extend_from_slice(&iv);
        out.extend_from_slice(&body);
        B64.encode(out)
    }

    pub fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptError> {
        let raw = B64
            .decode(ciphertext.trim())
            .map_err(|err| DecryptError::Encoding(err.to_string()))?;
        if raw.len() < IV_LEN {
            return Err(DecryptError::Truncated {
                len: raw.len(),
                min: IV_LEN,
            });
        }

        let (iv, body) = raw.split_at(IV_LEN);
        let mut body = body.to_vec();
        Aes256CfbDec::new_from_slices(&self.key[..], iv)
            .map_err(|err| DecryptError::Failed(err.to_string()))?
            .decrypt(&mut body);
        String::from_utf8(body).map_err(|_| DecryptError::NotUtf8)
    }
}

impl Decryptor for HttpSmsCipher {
    fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptError> {
        HttpSmsCipher::decrypt(self, ciphertext)
    }
}

/// Stand-in used when no key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingKey;

impl Decryptor for MissingKey {
    fn decrypt(&self, _ciphertext: &str) -> Result<String, DecryptError> {
        Err(DecryptError::KeyMissing)
    }
}
