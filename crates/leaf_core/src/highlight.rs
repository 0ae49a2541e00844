//! Syntax colouring for pretty-printed JSON.
//!
//! The tokenizer recognises the same lexemes a browser-side highlighter
//! would: a quoted string (a key when a colon follows), the literals
//! `true`/`false`/`null`, and numbers. Anything else passes through as
//! plain text. The HTML form escapes the source before any markup is added.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Quoted object key, including the trailing colon.
    Key,
    String,
    Number,
    Boolean,
    Null,
}

impl TokenKind {
    pub fn css_class(self) -> &'static str {
        match self {
            TokenKind::Key => "text-warning",
            TokenKind::String => "text-success",
            TokenKind::Number => "text-primary",
            TokenKind::Boolean => "text-info",
            TokenKind::Null => "text-danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub kind: Option<TokenKind>,
}

/// Split `src` into coloured and plain runs. Concatenating the `text` of
/// every span reproduces `src`.
pub fn tokenize(src: &str) -> Vec<Span> {
    let bytes = src.as_bytes();
    let mut spans: Vec<Span> = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let token = match bytes[i] {
            b'"' => scan_string(bytes, i),
            b'-' | b'0'..=b'9' => scan_number(bytes, i).map(|end| (end, TokenKind::Number)),
            c if c.is_ascii_alphabetic() && !is_word_byte(prev(bytes, i)) => {
                scan_literal(bytes, i)
            }
            _ => None,
        };
        match token {
            Some((end, kind)) => {
                push_plain(&mut spans, &src[plain_start..i]);
                spans.push(Span {
                    text: src[i..end].to_string(),
                    kind: Some(kind),
                });
                i = end;
                plain_start = end;
            }
            None => i += 1,
        }
    }
    push_plain(&mut spans, &src[plain_start..]);
    spans
}

/// Escape `&`, `<` and `>` so the text can be embedded in HTML.
pub fn escape_html(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    for c in src.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape `json`, then wrap each token in `<span class="...">`.
pub fn to_html(json: &str) -> String {
    let escaped = escape_html(json);
    let mut out = String::with_capacity(escaped.len() * 2);
    for span in tokenize(&escaped) {
        match span.kind {
            Some(kind) => {
                out.push_str("<span class=\"");
                out.push_str(kind.css_class());
                out.push_str("\">");
                out.push_str(&span.text);
                out.push_str("</span>");
            }
            None => out.push_str(&span.text),
        }
    }
    out
}

fn push_plain(spans: &mut Vec<Span>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = spans.last_mut()
        && last.kind.is_none()
    {
        last.text.push_str(text);
        return;
    }
    spans.push(Span {
        text: text.to_string(),
        kind: None,
    });
}

fn prev(bytes: &[u8], i: usize) -> u8 {
    if i == 0 { b' ' } else { bytes[i - 1] }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn scan_string(bytes: &[u8], start: usize) -> Option<(usize, TokenKind)> {
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'"' => {
                let end = j + 1;
                let mut k = end;
                while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                    k += 1;
                }
                if k < bytes.len() && bytes[k] == b':' {
                    return Some((k + 1, TokenKind::Key));
                }
                return Some((end, TokenKind::String));
            }
            _ => j += 1,
        }
    }
    None
}

fn scan_number(bytes: &[u8], start: usize) -> Option<usize> {
    let mut j = start;
    if bytes[j] == b'-' {
        j += 1;
    }
    let digits = j;
    while j < bytes.len() && bytes[j].is_ascii_digit() {
        j += 1;
    }
    if j == digits {
        return None;
    }
    if j < bytes.len() && bytes[j] == b'.' {
        j += 1;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
    }
    if j < bytes.len() && (bytes[j] == b'e' || bytes[j] == b'E') {
        let mut k = j + 1;
        if k < bytes.len() && (bytes[k] == b'+' || bytes[k] == b'-') {
            k += 1;
        }
        let exp_digits = k;
        while k < bytes.len() && bytes[k].is_ascii_digit() {
            k += 1;
        }
        if k > exp_digits {
            j = k;
        }
    }
    Some(j)
}

fn scan_literal(bytes: &[u8], start: usize) -> Option<(usize, TokenKind)> {
    let mut end = start;
    while end < bytes.len() && is_word_byte(bytes[end]) {
        end += 1;
    }
    match &bytes[start..end] {
        b"true" | b"false" => Some((end, TokenKind::Boolean)),
        b"null" => Some((end, TokenKind::Null)),
        _ => None,
    }
}
