//! Content-type detection from payload bytes.

/// Number of leading bytes inspected when sniffing.
pub const SNIFF_LIMIT: usize = 3072;

const TEXT_PLAIN: &str = "text/plain";
const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";
const OCTET_STREAM: &str = "application/octet-stream";

/// Returns the MIME type of `data`, judged from its leading bytes only.
pub fn sniff_content_type(data: &[u8]) -> String {
    let prefix = &data[..data.len().min(SNIFF_LIMIT)];
    if prefix.is_empty() {
        return TEXT_PLAIN.to_string();
    }
    if let Some(kind) = infer::get(prefix) {
        return kind.mime_type().to_string();
    }
    if is_text(prefix) {
        return TEXT_PLAIN_UTF8.to_string();
    }
    OCTET_STREAM.to_string()
}

fn is_text(prefix: &[u8]) -> bool {
    match std::str::from_utf8(prefix) {
        Ok(text) => !text.chars().any(is_binary_control),
        // a multi-byte sequence cut at the prefix boundary is still text
        Err(err) if err.error_len().is_none() => is_text(&prefix[..err.valid_up_to()]),
        Err(_) => false,
    }
}

fn is_binary_control(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{e}'..='\u{1a}' | '\u{1c}'..='\u{1f}')
}
