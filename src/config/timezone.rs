use anyhow::{Context, Result, bail};
use time::UtcOffset;

/// Parses `UTC`, `Z`, `+HH:MM[:SS]`, `+HH` or the compact `+HHMM` form.
pub fn parse_timezone(value: &str) -> Result<UtcOffset> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("UTC") || trimmed.eq_ignore_ascii_case("Z") {
        return Ok(UtcOffset::UTC);
    }

    let mut chars = trimmed.chars();
    let sign: i8 = match chars.next() {
        Some('+') => 1,
        Some('-') => -1,
        Some(_) => bail!("offset '{}' must start with '+' or '-'", value),
        None => bail!("offset is empty"),
    };

    let remainder = chars.as_str();
    let expanded;
    let remainder = if remainder.len() == 4 && remainder.chars().all(|c| c.is_ascii_digit()) {
        expanded = format!("{}:{}", &remainder[..2], &remainder[2..]);
        expanded.as_str()
    } else {
        remainder
    };

    let mut parts = remainder.split(':');
    let hours_str = parts.next().unwrap_or_default();
    let minutes_str = parts.next().unwrap_or("0");
    let seconds_str = parts.next().unwrap_or("0");
    if parts.next().is_some() {
        bail!("offset '{}' has too many components", value);
    }

    let hours = component(value, hours_str, "hour", 23)?;
    let minutes = component(value, minutes_str, "minute", 59)?;
    let seconds = component(value, seconds_str, "second", 59)?;

    UtcOffset::from_hms(sign * hours, sign * minutes, sign * seconds)
        .with_context(|| format!("offset '{}' out of range", value))
}

/// Reads one unsigned offset component no larger than `max`. A sign here
/// would be a second sign on the offset.
fn component(value: &str, text: &str, label: &str, max: u8) -> Result<i8> {
    if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        bail!("offset '{}' {} component invalid", value, label);
    }
    let number: u8 = text
        .parse()
        .with_context(|| format!("offset '{}' {} component invalid", value, label))?;
    if number > max {
        bail!("offset '{}' {} component out of range", value, label);
    }
    i8::try_from(number).with_context(|| format!("offset '{}' out of range", value))
}
