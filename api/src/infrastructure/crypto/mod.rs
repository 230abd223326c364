//! Field-level encryption for personal data stored at rest.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine as _;
use rand::RngCore;
use sha2::{Digest, Sha256};

const PREFIX: &str = "v1:";

fn derive_key(secret: &str) -> Key<Aes256Gcm> {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    let out = hasher.finalize();
    let mut k = [0u8; 32];
    k.copy_from_slice(&out);
    Key::<Aes256Gcm>::from_slice(&k).clone()
}

pub fn encrypt_string(secret: &str, plaintext: &str) -> anyhow::Result<String> {
    let cipher = Aes256Gcm::new(&derive_key(secret));
    let mut nonce_bytes = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let ct = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
        .map_err(|e| anyhow::anyhow!("encrypt failed: {}", e))?;
    let engine = base64::engine::general_purpose::STANDARD;
    Ok(format!(
        "{}{}:{}",
        PREFIX,
        engine.encode(nonce_bytes),
        engine.encode(ct)
    ))
}

pub fn decrypt_string(secret: &str, ciphertext: &str) -> anyhow::Result<String> {
    // Rows written before encryption was enabled hold plaintext
    let Some(rest) = ciphertext.strip_prefix(PREFIX) else {
        return Ok(ciphertext.to_string());
    };
    let (n_b64, c_b64) = rest
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("invalid format"))?;
    let engine = base64::engine::general_purpose::STANDARD;
    let nonce_bytes = engine
        .decode(n_b64)
        .map_err(|e| anyhow::anyhow!("b64 decode nonce: {}", e))?;
    if nonce_bytes.len() != 12 {
        anyhow::bail!("invalid nonce length");
    }
    let ct_bytes = engine
        .decode(c_b64)
        .map_err(|e| anyhow::anyhow!("b64 decode ct: {}", e))?;
    let cipher = Aes256Gcm::new(&derive_key(secret));
    let pt = cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ct_bytes.as_ref())
        .map_err(|e| anyhow::anyhow!("decrypt failed: {}", e))?;
    Ok(String::from_utf8(pt)?)
}

/// Encrypts an optional column value; `None` stays `None`.
pub fn encrypt_opt(secret: &str, value: Option<&str>) -> anyhow::Result<Option<String>> {
    value.map(|v| encrypt_string(secret, v)).transpose()
}

/// Decrypts an optional column value. An undecryptable value is dropped and
/// logged instead of failing the read.
pub fn decrypt_opt(secret: &str, value: Option<String>) -> Option<String> {
    let value = value?;
    match decrypt_string(secret, &value) {
        Ok(pt) => Some(pt),
        Err(e) => {
            tracing::warn!(error = ?e, "field_decrypt_failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let ct = encrypt_string("k", "081234567890").unwrap();
        assert!(ct.starts_with("v1:"));
        assert_ne!(ct, encrypt_string("k", "081234567890").unwrap());
        assert_eq!(decrypt_string("k", &ct).unwrap(), "081234567890");
    }

    #[test]
    fn wrong_key_fails() {
        let ct = encrypt_string("k", "secret").unwrap();
        assert!(decrypt_string("other", &ct).is_err());
        assert_eq!(decrypt_opt("other", Some(ct)), None);
    }

    #[test]
    fn plaintext_passes_through() {
        assert_eq!(decrypt_string("k", "0812").unwrap(), "0812");
        assert!(decrypt_string("k", "v1:broken").is_err());
    }
}
