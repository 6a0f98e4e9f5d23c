/// Strips markup from rendered HTML, decodes the entities the renderer
/// produces and collapses whitespace.
pub fn plain_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    let mut last_space = true;

    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                continue;
            }
            '>' if in_tag => {
                in_tag = false;
                continue;
            }
            _ if in_tag => continue,
            _ => {}
        }

        if ch.is_whitespace() {
            if !last_space {
                text.push(' ');
                last_space = true;
            }
        } else {
            text.push(ch);
            last_space = false;
        }
    }

    decode_entities(text.trim())
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Shortens `text` to at most `limit` characters, cutting at the last word
/// boundary and marking the cut with `...`.
pub fn truncate_words(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let cut = text
        .char_indices()
        .nth(limit)
        .map_or(text.len(), |(index, _)| index);
    let prefix = &text[..cut];
    let at_boundary = text[cut..].starts_with(char::is_whitespace);

    let kept = if at_boundary {
        prefix
    } else {
        match prefix.rfind(char::is_whitespace) {
            Some(space) if space > 0 => &prefix[..space],
            _ => prefix,
        }
    };

    format!("{}...", kept.trim_end())
}

pub fn summarize(html: &str, limit: usize) -> String {
    truncate_words(&plain_text(html), limit)
}
