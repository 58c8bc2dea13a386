//! BLAKE3 helpers shared by the embedding, caching and admission code.

/// Full 32-byte BLAKE3 digest of `text`.
#[inline]
pub fn hash_text(text: &str) -> [u8; 32] {
    *blake3::hash(text.as_bytes()).as_bytes()
}

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Used for feature hashing and map keys where a rare collision only costs a
/// little accuracy (a shared embedding bucket, a shared rate-limit window).
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}

/// Keys a cached embedding by provider and text so two providers never share vectors.
#[inline]
pub fn hash_embedding_key(provider: &str, text: &str) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(provider.as_bytes());
    hasher.update(b"|");
    hasher.update(text.as_bytes());
    *hasher.finalize().as_bytes()
}

/// Hashes a client signature (API key, forwarded address, user agent).
#[inline]
pub fn hash_client_signature(identity: &str, user_agent: &str) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(identity.as_bytes());
    hasher.update(b"\n");
    hasher.update(user_agent.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hasher.finalize().as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_to_u64_is_deterministic() {
        assert_eq!(hash_to_u64(b"cat"), hash_to_u64(b"cat"));
        assert_ne!(hash_to_u64(b"cat"), hash_to_u64(b"dog"));
    }

    #[test]
    fn test_embedding_key_separates_providers() {
        assert_ne!(
            hash_embedding_key("openai", "cat"),
            hash_embedding_key("lexical", "cat")
        );
        assert_eq!(hash_embedding_key("openai", "cat"), hash_embedding_key("openai", "cat"));
    }

    #[test]
    fn test_client_signature_depends_on_user_agent() {
        let a = hash_client_signature("10.0.0.1", "curl/8.0");
        let b = hash_client_signature("10.0.0.1", "Mozilla/5.0");
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_text_matches_blake3() {
        assert_eq!(hash_text("meme"), *blake3::hash(b"meme").as_bytes());
    }
}
