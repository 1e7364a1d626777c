use std::borrow::Cow;

/// Longest entity name we try to decode, `&CounterClockwiseContourIntegral;` fits.
const MAX_ENTITY_LEN: usize = 32;

/// Escape text so it can be placed in html content or a quoted attribute.
pub fn escape(text: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(text)
}

/// Decode html entities in text.
///
/// Unknown entities and stray `&` are kept as they are instead of failing, user written text is
/// full of them.
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        result.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let consumed = match entity_len(tail) {
            Some(len) => {
                match quick_xml::escape::unescape(&tail[..len]) {
                    Ok(v) => result.push_str(&v),
                    Err(_) => result.push_str(&tail[..len]),
                }
                len
            }
            None => {
                result.push('&');
                1
            }
        };
        rest = &tail[consumed..];
    }
    result.push_str(rest);

    Cow::Owned(result)
}

/// Decode then escape again.
///
/// Text that already contains entities is not escaped twice.
pub fn reencode(text: &str) -> String {
    let decoded = unescape(text);
    escape(decoded.as_ref()).into_owned()
}

/// Length of the `&name;` entity at the start of `tail`, including both ends.
fn entity_len(tail: &str) -> Option<usize> {
    let bytes = tail.as_bytes();
    let body = bytes[1..]
        .iter()
        .take(MAX_ENTITY_LEN)
        .position(|b| !(b.is_ascii_alphanumeric() || *b == b'#'))?;
    (body > 0 && bytes[1 + body] == b';').then_some(body + 2)
}
