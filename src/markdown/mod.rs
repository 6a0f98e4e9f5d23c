//! A small, lenient Markdown renderer.
//!
//! Rendering runs in two phases. The block phase classifies lines into
//! headings, paragraphs, lists, fenced code, quotes and rules. The inline
//! phase then renders emphasis, code spans and links inside the text of
//! each block, never inside fenced code. Rendering cannot fail: any
//! construct that does not parse is emitted as literal, escaped text.

mod inline;

pub use inline::{escape_attribute, escape_html, render_inline};

const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq)]
enum Block {
    Heading { level: usize, text: String },
    Paragraph(String),
    Code { language: Option<String>, code: String },
    Rule,
    Quote(Vec<Block>),
    List(List),
}

#[derive(Debug, Clone, PartialEq)]
struct List {
    kind: ListKind,
    start: u64,
    items: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Ordered,
}

struct ListItem<'a> {
    kind: ListKind,
    number: u64,
    text: &'a str,
}

pub fn render_markdown(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.lines().collect();
    let blocks = parse_blocks(&lines);
    let mut html = String::with_capacity(markdown.len() + markdown.len() / 4);
    for block in &blocks {
        render_block(block, &mut html);
    }
    html
}

fn parse_blocks(lines: &[&str]) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        let trimmed = line.trim();

        if let Some(info) = trimmed.strip_prefix(FENCE) {
            let (block, next) = parse_fenced(lines, index + 1, info);
            blocks.push(block);
            index = next;
            continue;
        }

        if let Some((level, text)) = heading(trimmed) {
            blocks.push(Block::Heading {
                level,
                text: text.to_string(),
            });
            index += 1;
            continue;
        }

        if is_rule(trimmed) {
            blocks.push(Block::Rule);
            index += 1;
            continue;
        }

        if trimmed.starts_with('>') {
            let mut quoted = Vec::new();
            while index < lines.len() {
                let Some(rest) = lines[index].trim_start().strip_prefix('>') else {
                    break;
                };
                quoted.push(rest.strip_prefix(' ').unwrap_or(rest));
                index += 1;
            }
            blocks.push(Block::Quote(parse_blocks(&quoted)));
            continue;
        }

        if let Some(first) = list_item(trimmed) {
            let (list, next) = parse_list(lines, index, first);
            blocks.push(Block::List(list));
            index = next;
            continue;
        }

        if trimmed.is_empty() {
            index += 1;
            continue;
        }

        let mut parts = vec![trimmed];
        index += 1;
        while index < lines.len() {
            let next = lines[index].trim();
            if next.is_empty() || interrupts_paragraph(next) {
                break;
            }
            parts.push(next);
            index += 1;
        }
        blocks.push(Block::Paragraph(parts.join(" ")));
    }

    blocks
}

fn parse_fenced(lines: &[&str], start: usize, info: &str) -> (Block, usize) {
    let language = info
        .split_whitespace()
        .next()
        .filter(|word| !word.contains('`'))
        .map(str::to_string);

    let mut code = String::new();
    let mut index = start;
    while index < lines.len() {
        if lines[index].trim().starts_with(FENCE) {
            return (Block::Code { language, code }, index + 1);
        }
        code.push_str(lines[index]);
        code.push('\n');
        index += 1;
    }

    // An unclosed fence runs to the end of the document.
    (Block::Code { language, code }, index)
}

fn parse_list<'a>(lines: &[&'a str], start: usize, first: ListItem<'a>) -> (List, usize) {
    let mut list = List {
        kind: first.kind,
        start: first.number,
        items: vec![first.text.trim().to_string()],
    };

    let mut index = start + 1;
    while index < lines.len() {
        let line = lines[index];
        let trimmed = line.trim();
        if trimmed.is_empty() {
            break;
        }

        match list_item(trimmed) {
            Some(item) if item.kind == list.kind => {
                list.items.push(item.text.trim().to_string());
            }
            Some(_) => break,
            None => {
                let indented = line.starts_with(' ') || line.starts_with('\t');
                if !indented || interrupts_paragraph(trimmed) {
                    break;
                }
                if let Some(last) = list.items.last_mut() {
                    if !last.is_empty() {
                        last.push(' ');
                    }
                    last.push_str(trimmed);
                }
            }
        }
        index += 1;
    }

    (list, index)
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|byte| *byte == b'#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    line[level..]
        .strip_prefix(' ')
        .map(|text| (level, text.trim()))
}

fn is_rule(line: &str) -> bool {
    let mut marker = None;
    let mut count = 0;
    for ch in line.chars() {
        if ch == ' ' || ch == '\t' {
            continue;
        }
        if !matches!(ch, '-' | '*' | '_') {
            return false;
        }
        match marker {
            None => marker = Some(ch),
            Some(existing) if existing != ch => return false,
            Some(_) => {}
        }
        count += 1;
    }
    count >= 3
}

fn list_item(line: &str) -> Option<ListItem<'_>> {
    if is_rule(line) {
        return None;
    }

    for marker in ["- ", "* ", "+ "] {
        if let Some(text) = line.strip_prefix(marker) {
            return Some(ListItem {
                kind: ListKind::Bullet,
                number: 1,
                text,
            });
        }
    }

    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || digits > 9 {
        return None;
    }
    let text = line[digits..].strip_prefix(". ")?;
    let number = line[..digits].parse().ok()?;
    Some(ListItem {
        kind: ListKind::Ordered,
        number,
        text,
    })
}

fn interrupts_paragraph(line: &str) -> bool {
    line.starts_with(FENCE)
        || heading(line).is_some()
        || is_rule(line)
        || line.starts_with('>')
        || list_item(line).is_some()
}

fn render_block(block: &Block, html: &mut String) {
    match block {
        Block::Heading { level, text } => {
            html.push_str(&format!("<h{level}>{}</h{level}>\n", render_inline(text)));
        }
        Block::Paragraph(text) => {
            html.push_str("<p>");
            html.push_str(&render_inline(text));
            html.push_str("</p>\n");
        }
        Block::Code { language, code } => {
            match language {
                Some(language) => html.push_str(&format!(
                    "<pre><code class=\"language-{}\">",
                    escape_attribute(language)
                )),
                None => html.push_str("<pre><code>"),
            }
            html.push_str(&escape_html(code));
            html.push_str("</code></pre>\n");
        }
        Block::Rule => html.push_str("<hr>\n"),
        Block::Quote(children) => {
            html.push_str("<blockquote>\n");
            for child in children {
                render_block(child, html);
            }
            html.push_str("</blockquote>\n");
        }
        Block::List(list) => {
            let tag = match list.kind {
                ListKind::Bullet => "ul",
                ListKind::Ordered => "ol",
            };
            if list.kind == ListKind::Ordered && list.start != 1 {
                html.push_str(&format!("<ol start=\"{}\">\n", list.start));
            } else {
                html.push_str(&format!("<{tag}>\n"));
            }
            for item in &list.items {
                html.push_str("<li>");
                html.push_str(&render_inline(item));
                html.push_str("</li>\n");
            }
            html.push_str(&format!("</{tag}>\n"));
        }
    }
}
