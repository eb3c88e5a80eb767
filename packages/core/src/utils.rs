// ABOUTME: Shared utility functions for specgen
// ABOUTME: Identifier generation

use rand::Rng;

/// Generate a unique identifier (8-character alphanumeric)
pub fn generate_id() -> String {
    const CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..8)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
