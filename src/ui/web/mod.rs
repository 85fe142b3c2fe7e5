use axum::{
    http::header,
    response::{Html, IntoResponse},
};

const UPLOAD_HTML: &str = include_str!("upload.html");
const SHARE_HTML: &str = include_str!("share.html");

const TOKEN_PLACEHOLDER: &str = "__TOKEN__";
const LIST_PLACEHOLDER: &str = "__LIST_ITEMS__";

//-- HELPER FUNCS
const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; connect-src 'self'; object-src 'none'; base-uri 'none'; frame-ancestors 'none'";

fn hardening_headers() -> [(header::HeaderName, &'static str); 4] {
    [
        (header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY),
        (header::X_FRAME_OPTIONS, "DENY"),
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::REFERRER_POLICY, "no-referrer"),
    ]
}

/// Minimal escaping for text and double-quoted attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

//-- UPLOAD PAGE
pub fn render_upload_page(token: &str) -> String {
    UPLOAD_HTML.replace(TOKEN_PLACEHOLDER, &escape_html(token))
}

pub fn serve_upload_page(token: &str) -> impl IntoResponse {
    (hardening_headers(), Html(render_upload_page(token)))
}

//-- SHARE PAGE

/// One line of the share listing.
pub struct ShareRow {
    pub index: usize,
    pub display_name: String,
    /// Human-readable size, or `?` when the file could not be stat'ed
    pub size: String,
}

pub fn render_share_page(token: &str, rows: &[ShareRow]) -> String {
    let token = escape_html(token);
    let items: String = rows
        .iter()
        .map(|row| {
            format!(
                "<li><a href=\"/download/{token}/{}\">{}</a> <span class=\"muted\">({})</span></li>",
                row.index,
                escape_html(&row.display_name),
                escape_html(&row.size),
            )
        })
        .collect();

    SHARE_HTML.replace(LIST_PLACEHOLDER, &items)
}

pub fn serve_share_page(token: &str, rows: &[ShareRow]) -> impl IntoResponse {
    (hardening_headers(), Html(render_share_page(token, rows)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_page_embeds_token_in_post_target() {
        let html = render_upload_page("abc_DEF-123");
        assert!(html.contains("/upload/abc_DEF-123"));
        assert!(!html.contains(TOKEN_PLACEHOLDER));
    }

    #[test]
    fn share_page_lists_rows_with_download_links() {
        let rows = vec![
            ShareRow {
                index: 0,
                display_name: "notes.txt".to_string(),
                size: "1.0 KB".to_string(),
            },
            ShareRow {
                index: 1,
                display_name: "photos.zip".to_string(),
                size: "?".to_string(),
            },
        ];
        let html = render_share_page("tok", &rows);

        assert!(html.contains("<a href=\"/download/tok/0\">notes.txt</a>"));
        assert!(html.contains("<a href=\"/download/tok/1\">photos.zip</a>"));
        assert!(html.contains("(1.0 KB)"));
        assert!(html.contains("(?)"));
    }

    #[test]
    fn escape_html_neutralises_markup() {
        assert_eq!(
            escape_html("<b>\"x\" & 'y'</b>"),
            "&lt;b&gt;&quot;x&quot; &amp; &#x27;y&#x27;&lt;/b&gt;"
        );
    }
}
