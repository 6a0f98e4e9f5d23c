use minijinja::value::Value;
use minijinja::{Environment, Error, ErrorKind};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::config::{Config, parse_format};
use crate::content::slugify;
use crate::utils::absolute_url;

pub fn register(env: &mut Environment<'static>, config: &Config) {
    let default_format = config.date_format.clone();
    env.add_filter(
        "format_date",
        move |value: Value, format: Option<String>| -> Result<Value, Error> {
            format_date(&value, format.as_deref().unwrap_or(&default_format))
        },
    );

    let base_url = config.base_url.clone();
    env.add_filter("absolute_url", move |path: String| {
        absolute_url(&base_url, &path)
    });

    env.add_filter("slugify", |value: String| slugify(&value));
}

/// Formats `datetime` with a `time` format description or the `RFC3339`
/// keyword, reporting failures as template errors.
pub(super) fn format_with(datetime: &OffsetDateTime, format: &str) -> Result<String, Error> {
    let description = parse_format(format).map_err(|err| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("invalid date format '{format}': {err:#}"),
        )
    })?;
    description.format(datetime).map_err(|err| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("failed to format datetime: {err:#}"),
        )
    })
}

fn format_date(value: &Value, format: &str) -> Result<Value, Error> {
    let raw = match value.as_str() {
        Some(text) if !text.trim().is_empty() => text,
        Some(_) => return Ok(Value::from("")),
        None if value.is_none() || value.is_undefined() => return Ok(Value::from("")),
        None => {
            return Err(Error::new(
                ErrorKind::InvalidOperation,
                "format_date filter expects an RFC3339 string such as page.date_iso",
            ));
        }
    };

    let datetime = OffsetDateTime::parse(raw, &Rfc3339).map_err(|err| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("format_date filter requires an RFC3339 datetime; got '{raw}': {err}"),
        )
    })?;

    format_with(&datetime, format).map(Value::from)
}
