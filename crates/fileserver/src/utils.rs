//! Response formatting helpers

use backend::FileHandle;

/// Format an uptime in seconds as `1d 2h 3m 4s`, leading zero units omitted
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, secs)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// MIME type to serve a file with
///
/// Prefers what Telegram reported, then a guess from the file name.
pub fn content_type(file: &FileHandle) -> String {
    if let Some(mime) = file.mime_type.as_deref().filter(|m| !m.is_empty()) {
        return mime.to_string();
    }

    file.file_name
        .as_deref()
        .map(|name| mime_guess::from_path(name).first_or_octet_stream().to_string())
        .unwrap_or_else(|| mime_guess::mime::APPLICATION_OCTET_STREAM.to_string())
}

/// Browsers play media and render html inline, everything else downloads
pub fn disposition(mime_type: &str) -> &'static str {
    if mime_type.contains("video/") || mime_type.contains("audio/") || mime_type.contains("/html")
    {
        "inline"
    } else {
        "attachment"
    }
}

/// Name to offer in `Content-Disposition`
pub fn file_name(file: &FileHandle) -> String {
    match file.file_name.as_deref() {
        Some(name) if !name.is_empty() => name
            .chars()
            .map(|c| match c {
                '"' => '\'',
                c if c.is_control() => '_',
                c => c,
            })
            .collect(),
        _ => format!("{}.unknown", hex::encode(rand::random::<[u8; 2]>())),
    }
}
