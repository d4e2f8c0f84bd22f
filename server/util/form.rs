/// Decodes a percent-encoded string (`%XX`) and converts `+` to space.
///
/// Invalid escapes are kept literally; the decoded bytes are read as UTF-8
/// with replacement characters for anything malformed.
pub fn url_decode(s: &str) -> String {
    let mut out = Vec::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let hi = (bytes[i + 1] as char).to_digit(16);
                let lo = (bytes[i + 2] as char).to_digit(16);
                match (hi, lo) {
                    (Some(h), Some(l)) => {
                        out.push(((h << 4) | l) as u8);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Parses `key=value&key2=value2` into a `Vec` of `(key, value)` pairs.
pub fn parse_form(body: &str) -> Vec<(String, String)> {
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let mut it = pair.splitn(2, '=');
            let k = it.next()?;
            let v = it.next().unwrap_or("");
            Some((url_decode(k), url_decode(v)))
        })
        .collect()
}

/// Looks up a key in parsed form pairs, returning the value if found.
pub fn form_get<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_escapes_and_plus() {
        assert_eq!(url_decode("a+b%2Bc%3D%3D"), "a b+c==");
        assert_eq!(url_decode("100%"), "100%");
        assert_eq!(url_decode("%zz"), "%zz");
    }

    #[test]
    fn base64_survives_form_encoding() {
        let pairs = parse_form("name=x&image=data%3Aimage%2Fpng%3Bbase64%2CiVBO%2Bw%3D%3D");
        assert_eq!(form_get(&pairs, "image"), Some("data:image/png;base64,iVBO+w=="));
        assert_eq!(form_get(&pairs, "missing"), None);
    }

    #[test]
    fn key_without_value_is_empty() {
        let pairs = parse_form("image=&other");
        assert_eq!(form_get(&pairs, "image"), Some(""));
        assert_eq!(form_get(&pairs, "other"), Some(""));
    }
}
