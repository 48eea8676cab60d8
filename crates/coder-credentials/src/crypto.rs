use crate::error::CredentialError;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

pub const PBKDF2_ITERATIONS: u32 = 100_000;
pub const KEY_LEN: usize = 32;
pub const SALT_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Stable per-machine identifier: SHA-256 over the host's MAC-address
/// node bytes. Falls back to a fixed string (still hashed) on
/// hosts with no discoverable MAC, so key derivation is always possible.
pub fn machine_identifier() -> Vec<u8> {
    let node_bytes = mac_address::get_mac_address()
        .ok()
        .flatten()
        .map(|mac| mac.bytes().to_vec())
        .unwrap_or_else(|| b"ninja-coder-no-mac".to_vec());
    Sha256::digest(&node_bytes).to_vec()
}

/// Derive the 32-byte master key from machine identity plus an optional
/// user passphrase (`NINJA_CREDENTIAL_PASSWORD`), via PBKDF2-HMAC-SHA256
/// with 100,000 iterations over `salt`.
pub fn derive_master_key(salt: &[u8; SALT_LEN], passphrase: Option<&str>) -> [u8; KEY_LEN] {
    let mut password = machine_identifier();
    if let Some(passphrase) = passphrase {
        password.extend_from_slice(passphrase.as_bytes());
    }
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(&password, salt, PBKDF2_ITERATIONS, &mut key);
    password.zeroize();
    key
}

pub fn random_salt() -> [u8; SALT_LEN] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Encrypt `plaintext` under `master_key` with a fresh random 12-byte
/// nonce. Stored format: `nonce ‖ ciphertext_with_tag`.
pub fn encrypt(master_key: &[u8; KEY_LEN], plaintext: &str) -> Result<Vec<u8>, CredentialError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(master_key));
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|e| CredentialError::Encryption(e.to_string()))?;
    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt a `nonce ‖ ciphertext_with_tag` blob. GCM tag mismatch (the
/// sole integrity check) surfaces as `CredentialError::Encryption`,
/// treated as tampering.
pub fn decrypt(master_key: &[u8; KEY_LEN], blob: &[u8]) -> Result<String, CredentialError> {
    if blob.len() < NONCE_LEN {
        return Err(CredentialError::Encryption("ciphertext too short".into()));
    }
    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(master_key));
    let nonce = Nonce::from_slice(nonce_bytes);
    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CredentialError::Encryption("GCM tag mismatch (possible tampering)".into()))?;
    String::from_utf8(plaintext).map_err(|e| CredentialError::Encryption(e.to_string()))
}
