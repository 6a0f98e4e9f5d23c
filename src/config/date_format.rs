use anyhow::{Context, Result, bail};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::format_description::{self, BorrowedFormatItem, OwnedFormatItem};

/// Display format for page dates, as configured by `date_format`.
#[derive(Debug, Clone)]
pub enum DateFormat {
    Rfc3339,
    Pattern(OwnedFormatItem),
}

impl DateFormat {
    pub fn format(&self, date: &OffsetDateTime) -> Result<String> {
        match self {
            DateFormat::Rfc3339 => date
                .format(&Rfc3339)
                .context("failed to format RFC3339 date"),
            DateFormat::Pattern(items) => date
                .format(items)
                .context("failed to format date with configured date_format"),
        }
    }
}

pub fn parse_format(value: &str) -> Result<DateFormat> {
    if value.eq_ignore_ascii_case("RFC3339") {
        return Ok(DateFormat::Rfc3339);
    }

    let items = format_description::parse(value)?;
    if !items
        .iter()
        .any(|item| matches!(item, BorrowedFormatItem::Component(_)))
    {
        bail!("date_format must contain at least one date or time component");
    }
    Ok(DateFormat::Pattern(OwnedFormatItem::from(items.as_slice())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn accept_rfc3339_keyword() {
        assert!(matches!(parse_format("rfc3339").unwrap(), DateFormat::Rfc3339));
    }

    #[test]
    fn pattern_formats_dates() {
        let format = parse_format("[day].[month].[year]").unwrap();
        let date = datetime!(2024-03-09 10:00 UTC);
        assert_eq!(format.format(&date).unwrap(), "09.03.2024");
    }

    #[test]
    fn rfc3339_formats_dates() {
        let date = datetime!(2024-03-09 10:00 UTC);
        let format = parse_format("RFC3339").unwrap();
        assert_eq!(format.format(&date).unwrap(), "2024-03-09T10:00:00Z");
    }

    #[test]
    fn reject_literal_only_format() {
        assert!(parse_format("???").is_err());
    }
}
