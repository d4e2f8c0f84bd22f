/// Returns the index of the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Splits `haystack` on every occurrence of `needle`, returning the pieces
/// between occurrences (excluding the needle itself).
pub fn split_on<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut result = Vec::new();
    let mut start = 0;
    while start <= haystack.len() {
        if let Some(pos) = find_subsequence(&haystack[start..], needle) {
            result.push(&haystack[start..start + pos]);
            start += pos + needle.len();
        } else {
            result.push(&haystack[start..]);
            break;
        }
    }
    result
}

/// Extracts the boundary token from a Content-Type header value like
/// `multipart/form-data; boundary=----WebKitFormBoundaryXXX`.
pub fn extract_boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(|s| s.trim())
        .find(|s| s.starts_with("boundary="))
        .map(|s| s["boundary=".len()..].trim_matches('"').to_owned())
        .filter(|b| !b.is_empty())
}

/// One named part of a multipart body.
#[derive(Debug, PartialEq)]
pub enum Part {
    Text(String),
    File(Vec<u8>),
}

/// Finds the part whose `Content-Disposition` carries `name="<field_name>"`.
///
/// Parts with a `filename=` attribute come back as raw bytes, the rest as
/// UTF-8 text.  Returns `None` when no part has that name.
pub fn find_part(body: &[u8], boundary: &str, field_name: &str) -> Option<Part> {
    let delimiter = format!("--{}", boundary);

    for part in split_on(body, delimiter.as_bytes()) {
        let sep = b"\r\n\r\n";
        let sep_pos = match find_subsequence(part, sep) {
            Some(pos) => pos,
            None => continue,
        };
        let headers = String::from_utf8_lossy(&part[..sep_pos]);
        if parse_disposition_name(&headers).as_deref() != Some(field_name) {
            continue;
        }
        let raw = &part[sep_pos + sep.len()..];
        let data = raw.strip_suffix(b"\r\n").unwrap_or(raw);
        return Some(if headers.contains("filename=") {
            Part::File(data.to_vec())
        } else {
            Part::Text(String::from_utf8_lossy(data).into_owned())
        });
    }
    None
}

/// Parses the `name="..."` value from a Content-Disposition header string,
/// skipping the `filename="..."` attribute.
fn parse_disposition_name(headers: &str) -> Option<String> {
    let key = "name=\"";
    let mut search = headers;
    while let Some(pos) = search.find(key) {
        let preceded_by_file = search[..pos].ends_with("file");
        let rest = &search[pos + key.len()..];
        let end = rest.find('"')?;
        if !preceded_by_file {
            return Some(rest[..end].to_owned());
        }
        search = &rest[end..];
    }
    None
}
