//! Stream link generation and parsing
//!
//! Links come in two shapes: `{base}{id}/{name}` for humans and
//! `{base}{hash}{id}` as a short form, where `hash` is the first six
//! characters of the file's unique id. The hash is a routing hint only and
//! is never checked against the file.

/// Length of the hash prefix in short links
pub const HASH_LENGTH: usize = 6;

/// File reference decoded from a request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamPath {
    /// Hash prefix of a short link, if present
    pub hash: Option<String>,
    /// Message id in the bin channel
    pub message_id: i32,
}

fn is_hash_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// Decode a request path (without the leading `/`)
///
/// A path of six hash characters followed only by digits is a short link.
/// Otherwise the first run of digits anywhere in the path is the message id.
///
/// # Returns
/// * `None` if the path holds no id that fits a Telegram message id
pub fn parse_stream_path(path: &str) -> Option<StreamPath> {
    let bytes = path.as_bytes();
    if bytes.len() > HASH_LENGTH
        && bytes[..HASH_LENGTH].iter().all(|&b| is_hash_char(b))
        && bytes[HASH_LENGTH..].iter().all(u8::is_ascii_digit)
    {
        let message_id = path[HASH_LENGTH..].parse().ok()?;
        return Some(StreamPath {
            hash: Some(path[..HASH_LENGTH].to_string()),
            message_id,
        });
    }

    let start = bytes.iter().position(u8::is_ascii_digit)?;
    let len = bytes[start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    let message_id = path[start..start + len].parse().ok()?;

    Some(StreamPath {
        hash: None,
        message_id,
    })
}

/// Short link hash for a file
pub fn short_hash(file_unique_id: &str) -> String {
    file_unique_id.chars().take(HASH_LENGTH).collect()
}

/// Human readable link: `{base}{id}/{name}`
pub fn stream_link(base_url: &str, message_id: i32, file_name: &str) -> String {
    format!(
        "{}{}/{}",
        base_url,
        message_id,
        urlencoding::encode(file_name)
    )
}

/// Short link: `{base}{hash}{id}`
pub fn short_link(base_url: &str, hash: &str, message_id: i32) -> String {
    format!("{}{}{}", base_url, hash, message_id)
}

/// Public base URL links are built on, always ending in `/`
pub fn public_base_url(fqdn: &str, port: u16, has_ssl: bool, no_port: bool) -> String {
    let scheme = if has_ssl { "https" } else { "http" };
    if no_port {
        format!("{}://{}/", scheme, fqdn)
    } else {
        format!("{}://{}:{}/", scheme, fqdn, port)
    }
}
