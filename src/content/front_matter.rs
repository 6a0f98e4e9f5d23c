use serde::Deserialize;
use serde_json::{Map as JsonMap, Value as JsonValue};
use serde_yaml::{Mapping, Value as YamlValue};
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::config::parse_timezone;

const FENCE: &str = "---";

const NAIVE_DATETIME: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const NAIVE_DATETIME_T: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const DATE_ONLY: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

#[derive(thiserror::Error, Debug)]
pub enum FrontMatterError {
    #[error("front matter opened with --- but never closed")]
    Unterminated,

    #[error("front matter is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("title is required")]
    MissingTitle,

    #[error(
        "date '{0}' must be RFC3339, 'YYYY-MM-DD', 'YYYY-MM-DD HH:MM:SS' or 'YYYY-MM-DD HH:MM:SS ±HHMM'"
    )]
    InvalidDate(String),

    #[error("front matter key {0} is not a string")]
    NonStringKey(String),

    #[error("front matter value for '{0}' cannot be represented")]
    UnsupportedValue(String),
}

/// Documented metadata of a content file, plus any keys the author added.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    pub title: String,
    pub description: Option<String>,
    pub date: Option<OffsetDateTime>,
    pub tags: Vec<String>,
    pub weight: i64,
    pub draft: bool,
    pub aliases: Vec<String>,
    pub extra: JsonMap<String, JsonValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFrontMatter {
    title: Option<String>,
    description: Option<String>,
    date: Option<String>,
    #[serde(deserialize_with = "deserialize_string_or_list")]
    tags: Vec<String>,
    weight: i64,
    draft: bool,
    #[serde(deserialize_with = "deserialize_string_or_list")]
    aliases: Vec<String>,
    #[serde(flatten)]
    extra: Mapping,
}

/// Splits `raw` into its metadata block and the Markdown body that follows.
///
/// Naive dates are interpreted at `offset`. A file without a leading fence
/// has no metadata at all, which fails the required-title check.
pub fn parse_front_matter(
    raw: &str,
    offset: UtcOffset,
) -> Result<(FrontMatter, String), FrontMatterError> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let (front, body) = split_block(raw)?;

    let parsed: RawFrontMatter = match front {
        Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str(&yaml)?,
        _ => RawFrontMatter::default(),
    };

    let title = parsed
        .title
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .ok_or(FrontMatterError::MissingTitle)?;

    let date = match parsed.date.as_deref() {
        Some(value) => parse_date(value, offset)?,
        None => None,
    };

    let front = FrontMatter {
        title,
        description: parsed
            .description
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty()),
        date,
        tags: parsed.tags,
        weight: parsed.weight,
        draft: parsed.draft,
        aliases: parsed.aliases,
        extra: mapping_to_json_map(&parsed.extra)?,
    };

    Ok((front, body))
}

fn split_block(raw: &str) -> Result<(Option<String>, String), FrontMatterError> {
    let mut lines = raw.lines();
    match lines.next() {
        Some(line) if line.trim() == FENCE => {}
        _ => return Ok((None, raw.to_string())),
    }

    let mut yaml_lines = Vec::new();
    for line in &mut lines {
        if line.trim() == FENCE {
            let mut body = lines.collect::<Vec<_>>().join("\n");
            if body.starts_with('\n') {
                body.remove(0);
            }
            return Ok((Some(yaml_lines.join("\n")), body));
        }
        yaml_lines.push(line);
    }

    Err(FrontMatterError::Unterminated)
}

fn parse_date(value: &str, offset: UtcOffset) -> Result<Option<OffsetDateTime>, FrontMatterError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Ok(datetime) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(Some(datetime));
    }

    for format in [NAIVE_DATETIME, NAIVE_DATETIME_T] {
        if let Ok(datetime) = PrimitiveDateTime::parse(trimmed, format) {
            return Ok(Some(datetime.assume_offset(offset)));
        }
    }

    if let Some((main, offset_part)) = trimmed.rsplit_once(' ')
        && let Ok(datetime) = PrimitiveDateTime::parse(main, NAIVE_DATETIME)
        && let Ok(explicit) = parse_timezone(offset_part)
    {
        return Ok(Some(datetime.assume_offset(explicit)));
    }

    if let Ok(date) = Date::parse(trimmed, DATE_ONLY) {
        return Ok(Some(
            PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_offset(offset),
        ));
    }

    Err(FrontMatterError::InvalidDate(trimmed.to_string()))
}

impl FrontMatter {
    /// Serializes the documented fields (and extras) back into a fenced block.
    pub fn to_yaml_block(&self) -> Result<String, FrontMatterError> {
        let mut mapping = Mapping::new();
        mapping.insert("title".into(), self.title.clone().into());
        if let Some(description) = &self.description {
            mapping.insert("description".into(), description.clone().into());
        }
        if let Some(date) = &self.date {
            let formatted = date
                .format(&Rfc3339)
                .map_err(|_| FrontMatterError::InvalidDate(date.to_string()))?;
            mapping.insert("date".into(), formatted.into());
        }
        if !self.tags.is_empty() {
            mapping.insert("tags".into(), string_sequence(&self.tags));
        }
        if self.weight != 0 {
            mapping.insert("weight".into(), self.weight.into());
        }
        if self.draft {
            mapping.insert("draft".into(), true.into());
        }
        if !self.aliases.is_empty() {
            mapping.insert("aliases".into(), string_sequence(&self.aliases));
        }
        for (key, value) in &self.extra {
            mapping.insert(key.as_str().into(), serde_yaml::to_value(value)?);
        }

        let yaml = serde_yaml::to_string(&mapping)?;
        Ok(format!("{FENCE}\n{yaml}{FENCE}\n"))
    }
}

fn string_sequence(items: &[String]) -> YamlValue {
    YamlValue::Sequence(items.iter().cloned().map(YamlValue::from).collect())
}

fn deserialize_string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Value {
        Many(Vec<String>),
        One(String),
        None(serde::de::IgnoredAny),
    }

    let items = match Value::deserialize(deserializer)? {
        Value::Many(items) => items,
        Value::One(value) => value.split(',').map(str::to_string).collect(),
        Value::None(_) => Vec::new(),
    };

    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

fn mapping_to_json_map(mapping: &Mapping) -> Result<JsonMap<String, JsonValue>, FrontMatterError> {
    let mut map = JsonMap::new();
    for (key, value) in mapping {
        let key = key
            .as_str()
            .ok_or_else(|| FrontMatterError::NonStringKey(format!("{key:?}")))?;
        let json = serde_json::to_value(value)
            .map_err(|_| FrontMatterError::UnsupportedValue(key.to_string()))?;
        map.insert(key.to_string(), json);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, offset};

    fn parse(raw: &str) -> Result<(FrontMatter, String), FrontMatterError> {
        parse_front_matter(raw, UtcOffset::UTC)
    }

    #[test]
    fn parses_documented_fields() {
        let raw = "---\ntitle: Hello\ndescription: A greeting\ndate: 2024-02-01T12:00:00Z\ntags: [intro, Rust]\nweight: 3\ndraft: true\naliases:\n  - /old/hello/\n---\n\nSome **bold** text.";
        let (front, body) = parse(raw).unwrap();
        assert_eq!(front.title, "Hello");
        assert_eq!(front.description.as_deref(), Some("A greeting"));
        assert_eq!(front.date, Some(datetime!(2024-02-01 12:00 UTC)));
        assert_eq!(front.tags, vec!["intro", "Rust"]);
        assert_eq!(front.weight, 3);
        assert!(front.draft);
        assert_eq!(front.aliases, vec!["/old/hello/"]);
        assert_eq!(body, "Some **bold** text.");
    }

    #[test]
    fn missing_optional_fields_get_defaults() {
        let (front, body) = parse("---\ntitle: Plain\n---\nBody").unwrap();
        assert!(front.tags.is_empty());
        assert!(front.aliases.is_empty());
        assert_eq!(front.weight, 0);
        assert!(!front.draft);
        assert_eq!(front.date, None);
        assert_eq!(body, "Body");
    }

    #[test]
    fn unknown_keys_are_retained() {
        let (front, _) = parse("---\ntitle: Extra\nlocation:\n  city: Athens\n---\n").unwrap();
        assert_eq!(
            front.extra.get("location").and_then(|value| value.get("city")),
            Some(&JsonValue::String("Athens".into()))
        );
    }

    #[test]
    fn comma_separated_lists_are_split() {
        let (front, _) = parse("---\ntitle: Csv\ntags: one, two , ,three\n---\n").unwrap();
        assert_eq!(front.tags, vec!["one", "two", "three"]);
    }

    #[test]
    fn empty_tags_field_is_allowed() {
        let (front, _) = parse("---\ntitle: Empty\ntags:\n---\n").unwrap();
        assert!(front.tags.is_empty());
    }

    #[test]
    fn missing_fence_means_no_front_matter() {
        let error = parse("# Just a body").unwrap_err();
        assert!(matches!(error, FrontMatterError::MissingTitle));
    }

    #[test]
    fn blank_title_is_rejected() {
        let error = parse("---\ntitle: \"  \"\n---\n").unwrap_err();
        assert!(matches!(error, FrontMatterError::MissingTitle));
    }

    #[test]
    fn unterminated_block_is_rejected() {
        let error = parse("---\ntitle: Open\nBody without a closing fence").unwrap_err();
        assert!(matches!(error, FrontMatterError::Unterminated));
    }

    #[test]
    fn unparsable_date_is_rejected() {
        let error = parse("---\ntitle: When\ndate: next tuesday\n---\n").unwrap_err();
        assert!(matches!(error, FrontMatterError::InvalidDate(value) if value == "next tuesday"));
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        let error = parse("---\ntitle: [unclosed\n---\n").unwrap_err();
        assert!(matches!(error, FrontMatterError::Yaml(_)));
    }

    #[test]
    fn naive_dates_use_the_given_offset() {
        let (front, _) =
            parse_front_matter("---\ntitle: T\ndate: 2024-01-02 09:30:00\n---\n", offset!(+2))
                .unwrap();
        assert_eq!(front.date, Some(datetime!(2024-01-02 09:30 +2)));

        let (front, _) =
            parse_front_matter("---\ntitle: T\ndate: 2024-01-02\n---\n", offset!(+2)).unwrap();
        assert_eq!(front.date, Some(datetime!(2024-01-02 0:00 +2)));
    }

    #[test]
    fn explicit_numeric_offset_wins() {
        let (front, _) = parse("---\ntitle: T\ndate: 2013-01-18 00:25:24 +0200\n---\n").unwrap();
        assert_eq!(front.date.unwrap().offset(), offset!(+2));
    }

    #[test]
    fn malformed_numeric_offset_is_an_invalid_date() {
        for raw in [
            "2024-01-01 10:00:00 --128",
            "2024-01-01 10:00:00 +-05:00",
            "2024-01-01 10:00:00 +2500",
        ] {
            let source = format!("---\ntitle: T\ndate: \"{raw}\"\n---\n");
            let error = parse(&source).unwrap_err();
            assert!(matches!(error, FrontMatterError::InvalidDate(ref value) if value == raw));
        }
    }

    #[test]
    fn blank_date_means_undated() {
        let (front, _) = parse("---\ntitle: T\ndate: \"\"\n---\n").unwrap();
        assert_eq!(front.date, None);
    }

    #[test]
    fn documented_fields_round_trip() {
        let raw = "---\ntitle: Round Trip\ndescription: Both ways\ndate: 2024-05-06T08:09:10+03:00\ntags: [a, B]\nweight: -2\ndraft: true\naliases: [/x/, /y/]\nmood: calm\n---\nBody";
        let (front, _) = parse(raw).unwrap();

        let block = front.to_yaml_block().unwrap();
        assert!(block.starts_with("---\n"));
        let (again, body) = parse(&format!("{block}\nBody")).unwrap();
        assert_eq!(again, front);
        assert_eq!(body, "Body");
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let (front, _) = parse("\u{feff}---\ntitle: Bom\n---\n").unwrap();
        assert_eq!(front.title, "Bom");
    }
}
