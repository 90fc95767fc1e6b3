use sha2::{Digest, Sha256};

/// Deterministic cache-file prefix for an image URL: `img-{short_hash}-`.
/// The tempfile machinery appends its own random suffix, so concurrent
/// loads of the same URL never collide.
pub fn handle_prefix(url: &str) -> String {
    format!("img-{}-", short_hash(url))
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
