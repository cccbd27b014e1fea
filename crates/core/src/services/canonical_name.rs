//! Canonical name validation.
//!
//! A canonical name is a slash-separated path such as `mls/volatile/derp`.
//! It doubles as the storage path of the emote's images, so anything that
//! could escape the upload tree, collide with a hover image, or be parsed as
//! part of a URL query is rejected.

use crate::error::{EmoteError, EmoteResult};

/// Normalize and validate a submitted canonical name.
///
/// Surrounding whitespace is trimmed and runs of `/` are collapsed before the
/// checks run, so `validate(validate(n)) == validate(n)`.
pub fn validate(raw: &str) -> EmoteResult<String> {
    let name = collapse_slashes(raw.trim());

    let reject = |reason: &str| Err(EmoteError::InvalidName(reason.to_string()));

    if name.contains('.') {
        return reject("canonical_name may not contain dots");
    }
    if name.contains('\\') {
        return reject("canonical_name may not contain backward slashes");
    }
    // Served as part of a URL path.
    if name.contains('?') {
        return reject("canonical_name may not contain a question mark");
    }
    if name.contains('\0') {
        return reject("canonical_name may not contain a zero byte value");
    }
    // Hover images are stored next to the base image as `<name>_hover.<ext>`.
    if name.contains("_hover") {
        return reject("canonical_name may not contain the substring '_hover'");
    }
    if name.starts_with('/') {
        return reject("canonical_name may not start with a forward slash");
    }
    if name.is_empty() {
        return reject("canonical_name may not be an empty string");
    }

    Ok(name)
}

fn collapse_slashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut previous_slash = false;
    for c in s.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        out.push(c);
    }
    out
}
