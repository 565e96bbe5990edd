//! Formatting and matching helpers for the card.

use crate::card::NowPlayingMatch;

/// Formats a pending seek offset as `+M:SS` / `-M:SS`.
pub fn format_seek_delta(delta_secs: f64) -> String {
    let sign = if delta_secs > 0.0 { '+' } else { '-' };
    let total = delta_secs.abs().round() as u64;
    format!("{}{}:{:02}", sign, total / 60, total % 60)
}

/// Characters whose escapes stay encoded when decoding a whole URI.
const URI_RESERVED: &[u8] = b";/?:@&=+$,#";

/// Percent-decodes a content id the way the host front end displays it.
///
/// Escapes of URI delimiters (`%2F`, `%3F`, `%23`, ...) are kept so they stay
/// distinguishable from the delimiters themselves. Ids that are not valid
/// UTF-8 once decoded are returned unchanged.
pub fn decode_content_id(content_id: &str) -> String {
    decode_uri(content_id).unwrap_or_else(|| content_id.to_string())
}

fn decode_uri(uri: &str) -> Option<String> {
    let bytes = uri.as_bytes();
    let mut decoded = String::with_capacity(uri.len());
    let mut chunk_start = 0;
    let mut i = 0;

    while i + 2 < bytes.len() {
        let is_escape = bytes[i] == b'%'
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit();
        if !is_escape {
            i += 1;
            continue;
        }
        let byte = u8::from_str_radix(&uri[i + 1..i + 3], 16).ok()?;
        if URI_RESERVED.contains(&byte) {
            decoded.push_str(&urlencoding::decode(&uri[chunk_start..i]).ok()?);
            decoded.push_str(&uri[i..i + 3]);
            chunk_start = i + 3;
        }
        i += 3;
    }

    decoded.push_str(&urlencoding::decode(&uri[chunk_start..]).ok()?);
    Some(decoded)
}

/// Whether a listing row is the item the selected player is playing.
pub fn is_now_playing(
    playing_id: &str,
    item_content_id: &str,
    item_title: &str,
    mode: NowPlayingMatch,
) -> bool {
    if playing_id == item_content_id {
        return true;
    }
    match mode {
        NowPlayingMatch::Exact => false,
        NowPlayingMatch::TitleSubstring => playing_id.contains(item_title),
    }
}
