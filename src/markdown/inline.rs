/// Renders inline Markdown: code spans, emphasis, strong emphasis, links and
/// images. Anything that fails to match is emitted as literal text.
pub fn render_inline(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len() + 16);
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' if bytes.get(i + 1).is_some_and(u8::is_ascii_punctuation) => {
                push_escaped(&mut out, &text[i + 1..i + 2]);
                i += 2;
            }
            b'`' => {
                let run = run_length(bytes, i, b'`');
                match find_code_close(bytes, i + run, run) {
                    Some(close) => {
                        out.push_str("<code>");
                        push_escaped(&mut out, trim_code(&text[i + run..close]));
                        out.push_str("</code>");
                        i = close + run;
                    }
                    None => {
                        out.push_str(&text[i..i + run]);
                        i += run;
                    }
                }
            }
            b'*' | b'_' => match emphasis(text, i) {
                Some((html, next)) => {
                    out.push_str(&html);
                    i = next;
                }
                None => {
                    out.push(bytes[i] as char);
                    i += 1;
                }
            },
            b'!' if bytes.get(i + 1) == Some(&b'[') => match link(text, i + 1, true) {
                Some((html, next)) => {
                    out.push_str(&html);
                    i = next;
                }
                None => {
                    out.push('!');
                    i += 1;
                }
            },
            b'[' => match link(text, i, false) {
                Some((html, next)) => {
                    out.push_str(&html);
                    i = next;
                }
                None => {
                    out.push('[');
                    i += 1;
                }
            },
            b'<' | b'>' | b'&' => {
                push_escaped(&mut out, &text[i..i + 1]);
                i += 1;
            }
            _ => {
                let end = bytes[i..]
                    .iter()
                    .position(|byte| is_special(*byte))
                    .map_or(bytes.len(), |offset| i + offset);
                // Specials are ASCII, so `end` is always a char boundary.
                let end = end.max(i + 1);
                let end = next_char_boundary(text, end);
                out.push_str(&text[i..end]);
                i = end;
            }
        }
    }

    out
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    push_escaped(&mut escaped, text);
    escaped
}

pub fn escape_attribute(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
}

fn is_special(byte: u8) -> bool {
    matches!(
        byte,
        b'\\' | b'`' | b'*' | b'_' | b'!' | b'[' | b'<' | b'>' | b'&'
    )
}

fn next_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

fn run_length(bytes: &[u8], start: usize, marker: u8) -> usize {
    bytes[start..]
        .iter()
        .take_while(|byte| **byte == marker)
        .count()
}

fn find_code_close(bytes: &[u8], from: usize, run: usize) -> Option<usize> {
    let mut k = from;
    while k < bytes.len() {
        if bytes[k] == b'`' {
            let length = run_length(bytes, k, b'`');
            if length == run {
                return Some(k);
            }
            k += length;
        } else {
            k += 1;
        }
    }
    None
}

fn trim_code(content: &str) -> &str {
    if content.len() >= 2
        && content.starts_with(' ')
        && content.ends_with(' ')
        && !content.trim().is_empty()
    {
        &content[1..content.len() - 1]
    } else {
        content
    }
}

fn previous_char(text: &str, index: usize) -> Option<char> {
    text[..index].chars().next_back()
}

fn next_char(text: &str, index: usize) -> Option<char> {
    text.get(index..).and_then(|rest| rest.chars().next())
}

fn can_open(text: &str, start: usize, width: usize, marker: u8) -> bool {
    let Some(next) = next_char(text, start + width) else {
        return false;
    };
    if next.is_whitespace() {
        return false;
    }
    if marker == b'_' && previous_char(text, start).is_some_and(char::is_alphanumeric) {
        return false;
    }
    true
}

fn can_close(text: &str, position: usize, width: usize, marker: u8) -> bool {
    if previous_char(text, position).is_none_or(char::is_whitespace) {
        return false;
    }
    if marker == b'_' && next_char(text, position + width).is_some_and(char::is_alphanumeric) {
        return false;
    }
    true
}

fn emphasis(text: &str, start: usize) -> Option<(String, usize)> {
    let bytes = text.as_bytes();
    let marker = bytes[start];
    let width = if run_length(bytes, start, marker) >= 2 { 2 } else { 1 };

    if !can_open(text, start, width, marker) {
        return None;
    }

    let close = find_closer(text, start + width, marker, width)?;
    let inner = render_inline(&text[start + width..close]);
    let html = if width == 2 {
        format!("<strong>{inner}</strong>")
    } else {
        format!("<em>{inner}</em>")
    };
    Some((html, close + width))
}

fn find_closer(text: &str, from: usize, marker: u8, width: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut k = from;

    while k < bytes.len() {
        match bytes[k] {
            b'\\' => k += 2,
            b'`' => {
                let run = run_length(bytes, k, b'`');
                k = match find_code_close(bytes, k + run, run) {
                    Some(close) => close + run,
                    None => k + run,
                };
            }
            byte if byte == marker => {
                let run = run_length(bytes, k, marker);
                let candidate = match width {
                    2 if run >= 2 => Some(k + run - 2),
                    1 if run == 1 => Some(k),
                    _ => None,
                };
                if let Some(position) = candidate.filter(|position| *position > from) {
                    if can_close(text, position, width, marker) {
                        return Some(position);
                    }
                }
                k += run;
            }
            _ => k += 1,
        }
    }

    None
}

fn link(text: &str, open: usize, image: bool) -> Option<(String, usize)> {
    let bytes = text.as_bytes();
    let close = matching_bracket(bytes, open)?;
    if bytes.get(close + 1) != Some(&b'(') {
        return None;
    }
    let paren_close = matching_paren(bytes, close + 1)?;

    let label = &text[open + 1..close];
    let (url, title) = destination(&text[close + 2..paren_close])?;

    let title_attr = title
        .map(|title| format!(" title=\"{}\"", escape_attribute(title)))
        .unwrap_or_default();

    let html = if image {
        format!(
            "<img src=\"{}\" alt=\"{}\"{title_attr}>",
            escape_attribute(url),
            escape_attribute(label)
        )
    } else {
        format!(
            "<a href=\"{}\"{title_attr}>{}</a>",
            escape_attribute(url),
            render_inline(label)
        )
    };

    Some((html, paren_close + 1))
}

fn matching_bracket(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut k = open;
    while k < bytes.len() {
        match bytes[k] {
            b'\\' => k += 1,
            b'`' => {
                let run = run_length(bytes, k, b'`');
                if let Some(close) = find_code_close(bytes, k + run, run) {
                    k = close + run - 1;
                } else {
                    k += run - 1;
                }
            }
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(k);
                }
            }
            _ => {}
        }
        k += 1;
    }
    None
}

fn matching_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut k = open;
    while k < bytes.len() {
        match bytes[k] {
            b'\\' => k += 1,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(k);
                }
            }
            _ => {}
        }
        k += 1;
    }
    None
}

fn destination(raw: &str) -> Option<(&str, Option<&str>)> {
    let raw = raw.trim();
    let (url, rest) = match raw.find(char::is_whitespace) {
        Some(split) => (&raw[..split], raw[split..].trim()),
        None => (raw, ""),
    };
    let url = url
        .strip_prefix('<')
        .and_then(|inner| inner.strip_suffix('>'))
        .unwrap_or(url);
    if url.is_empty() {
        return None;
    }
    if rest.is_empty() {
        return Some((url, None));
    }

    let title = rest
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .or_else(|| {
            rest.strip_prefix('\'')
                .and_then(|inner| inner.strip_suffix('\''))
        })?;
    Some((url, Some(title)))
}
