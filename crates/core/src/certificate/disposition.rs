//! `Content-Disposition` headers for certificate downloads.
//!
//! The header carries two names: a quoted ASCII `filename` for old clients
//! and an RFC 5987 `filename*` with the exact UTF-8 name. Readers prefer
//! `filename*`.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Bytes RFC 5987 `attr-char` leaves unescaped, besides alphanumerics.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Builds an `attachment` disposition for `filename`.
#[must_use]
pub fn content_disposition(filename: &str) -> String {
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_fallback(filename),
        utf8_percent_encode(filename, ATTR_CHAR)
    )
}

/// Extracts the download name from a `Content-Disposition` header.
///
/// `filename*` wins over `filename`. Returns `None` when neither parameter
/// yields a non-empty name.
#[must_use]
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in split_params(header) {
        let Some((name, value)) = param.split_once('=') else {
            continue;
        };
        match name.trim().to_ascii_lowercase().as_str() {
            "filename*" => extended = decode_extended(value.trim()),
            "filename" => plain = Some(unquote(value.trim())),
            _ => {}
        }
    }

    extended.or(plain).filter(|name| !name.is_empty())
}

fn ascii_fallback(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && !matches!(c, '"' | '\\' | ';')) || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Splits on `;` outside double quotes.
fn split_params(header: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;

    for (i, c) in header.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                params.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(&header[start..]);
    params
}

fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return value.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Decodes `charset'lang'pct-encoded`. Only UTF-8 (and its ASCII subset) is accepted.
fn decode_extended(value: &str) -> Option<String> {
    let mut parts = value.splitn(3, '\'');
    let charset = parts.next()?;
    let _language = parts.next()?;
    let encoded = parts.next()?;

    if !charset.eq_ignore_ascii_case("utf-8") && !charset.eq_ignore_ascii_case("us-ascii") {
        return None;
    }
    percent_decode_str(encoded)
        .decode_utf8()
        .ok()
        .map(|name| name.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition("certificat.pdf"),
            "attachment; filename=\"certificat.pdf\"; filename*=UTF-8''certificat.pdf"
        );
    }

    #[test]
    fn test_content_disposition_non_ascii() {
        assert_eq!(
            content_disposition("arrêt maladie.pdf"),
            "attachment; filename=\"arr_t maladie.pdf\"; filename*=UTF-8''arr%C3%AAt%20maladie.pdf"
        );
    }

    #[rstest]
    #[case("attachment; filename=\"a.pdf\"; filename*=UTF-8''b%C3%A9.pdf", Some("bé.pdf"))]
    #[case("attachment; filename*=utf-8''r%C3%A9sum%C3%A9.pdf; filename=\"x.pdf\"", Some("résumé.pdf"))]
    #[case("attachment; filename=\"scan; page 1.png\"", Some("scan; page 1.png"))]
    #[case("attachment; filename=plain.txt", Some("plain.txt"))]
    #[case("attachment; filename=\"say \\\"hi\\\".pdf\"", Some("say \"hi\".pdf"))]
    #[case("attachment; filename*=ISO-8859-1''caf%E9.pdf; filename=\"cafe.pdf\"", Some("cafe.pdf"))]
    #[case("attachment", None)]
    #[case("attachment; filename=\"\"", None)]
    fn test_filename_from_content_disposition(#[case] header: &str, #[case] expected: Option<&str>) {
        assert_eq!(
            filename_from_content_disposition(header).as_deref(),
            expected
        );
    }

    proptest! {
        /// Any name survives a build-then-parse cycle exactly.
        #[test]
        fn prop_disposition_preserves_name(name in "\\PC{1,40}") {
            let header = content_disposition(&name);
            prop_assert_eq!(filename_from_content_disposition(&header), Some(name));
        }

        /// The plain parameter never contains anything that breaks the quoted string.
        #[test]
        fn prop_ascii_fallback_is_safe(name in "\\PC{0,40}") {
            let fallback = ascii_fallback(&name);
            prop_assert!(fallback.chars().all(|c| c.is_ascii() && c != '"' && c != '\\' && c != ';'));
            prop_assert_eq!(fallback.chars().count(), name.chars().count());
        }
    }
}
