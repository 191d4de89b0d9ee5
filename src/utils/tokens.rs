//! Token estimation

/// Rough token count for `chars` characters of source text (chars / 4).
pub fn estimate_tokens(chars: usize) -> usize {
    chars / 4
}
