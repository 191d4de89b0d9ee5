//! Shared helpers: text decoding, paths, token estimates

pub mod encoding;
pub mod paths;
pub mod tokens;

pub use encoding::{detect_encoding, read_text_lossy, TextDecoder};
pub use paths::{display_path, has_valid_extension, is_hidden_name, normalize_path};
pub use tokens::estimate_tokens;
