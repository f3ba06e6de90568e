use rand::RngCore;

/// Default number of random bytes in a generated shared secret.
pub const DEFAULT_SECRET_BYTES: usize = 16;

/// Hex-encoded random token of `num_bytes` bytes (`2 * num_bytes` characters).
pub fn generate_secret(num_bytes: usize) -> String {
    let mut bytes = vec![0u8; num_bytes];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hex-encoded random token of [`DEFAULT_SECRET_BYTES`] bytes.
pub fn generate_default_secret() -> String {
    generate_secret(DEFAULT_SECRET_BYTES)
}
