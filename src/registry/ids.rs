//! Deterministic identifiers.
//!
//! Ids are truncated blake3 digests, so the same folder and the same file
//! always map to the same id across rescans of an unchanged tree.

use std::path::{Component, Path};

const CUSTOMER_ID_LEN: usize = 12;
const CERTIFICATE_ID_LEN: usize = 16;

/// Derive a customer id from the folder name and folder path.
pub fn customer_id(name: &str, folder_path: &Path) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"customer\0");
    hasher.update(name.as_bytes());
    hasher.update(b"\0");
    hasher.update(folder_path.to_string_lossy().as_bytes());
    truncated_hex(hasher.finalize(), CUSTOMER_ID_LEN)
}

/// Derive a certificate id from its owning customer and its path relative
/// to the customer folder.
///
/// Path separators are normalised to `/` so ids do not depend on the host
/// platform.
pub fn certificate_id(customer_id: &str, relative_path: &Path) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"certificate\0");
    hasher.update(customer_id.as_bytes());
    hasher.update(b"\0");
    hasher.update(normalized_relative(relative_path).as_bytes());
    truncated_hex(hasher.finalize(), CERTIFICATE_ID_LEN)
}

fn normalized_relative(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn truncated_hex(hash: blake3::Hash, len: usize) -> String {
    let mut hex = hash.to_hex().to_string();
    hex.truncate(len);
    hex
}
