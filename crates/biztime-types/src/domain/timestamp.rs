//! Timestamps travel as RFC 3339 UTC strings with millisecond precision,
//! e.g. `2018-01-01T05:00:00.000Z`. Use with `#[serde(with = "...")]`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

pub fn format(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(ts))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(serde::de::Error::custom)
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        ts: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => super::serialize(ts, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|s| parse(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_with_millis_and_zulu() {
        let ts = Utc.with_ymd_and_hms(2018, 1, 1, 5, 0, 0).unwrap();
        assert_eq!(format(&ts), "2018-01-01T05:00:00.000Z");
    }

    #[test]
    fn parses_sqlite_strftime_output() {
        let ts = parse("2023-06-13T04:00:00.250Z").unwrap();
        assert_eq!(format(&ts), "2023-06-13T04:00:00.250Z");
    }

    #[test]
    fn parses_offsets_into_utc() {
        let ts = parse("2018-01-01T00:00:00-05:00").unwrap();
        assert_eq!(format(&ts), "2018-01-01T05:00:00.000Z");
    }
}
