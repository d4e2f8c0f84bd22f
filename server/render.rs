/// Renders the single upload page served at `/`.
///
/// The page is compiled in with `include_str!` and uses `{{TOKEN}}`
/// placeholders that are substituted per request.

const TEMPLATE: &str = include_str!("assets/index.html");

pub fn render_index(max_body_bytes: usize) -> String {
    let mut html = TEMPLATE.to_owned();
    let mb = (max_body_bytes / (1024 * 1024)).max(1);
    html = html.replace("{{MAX_BODY_MB}}", &mb.to_string());
    blank_remaining(html)
}

/// Replaces any `{{TOKEN}}` that wasn't substituted with an empty string.
fn blank_remaining(mut html: String) -> String {
    while let Some(start) = html.find("{{") {
        if let Some(end) = html[start..].find("}}") {
            let abs_end = start + end + 2;
            html.replace_range(start..abs_end, "");
        } else {
            break;
        }
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_filled() {
        let html = render_index(10 * 1024 * 1024);
        assert!(html.contains("max 10 MB"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn unknown_tokens_are_blanked() {
        assert_eq!(blank_remaining("a{{X}}b{{Y}}".into()), "ab");
        assert_eq!(blank_remaining("open {{ only".into()), "open {{ only");
    }
}
