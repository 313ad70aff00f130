use anyhow::Context;
use time::UtcOffset;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_minutes: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub session: SessionConfig,
    /// Offset applied to UTC when deciding "today" and the current meal slot.
    pub meal_clock_offset: UtcOffset,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let session = SessionConfig {
            cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "tiffin_session".into()),
            ttl_minutes: std::env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 7),
            cookie_secure: std::env::var("SESSION_COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        };
        let meal_clock_offset = match std::env::var("MEAL_CLOCK_UTC_OFFSET_MINUTES") {
            Ok(raw) => parse_offset_minutes(&raw)?,
            Err(_) => UtcOffset::UTC,
        };
        Ok(Self {
            database_url,
            max_connections,
            session,
            meal_clock_offset,
        })
    }
}

pub fn parse_offset_minutes(raw: &str) -> anyhow::Result<UtcOffset> {
    let minutes = raw
        .trim()
        .parse::<i32>()
        .with_context(|| format!("invalid MEAL_CLOCK_UTC_OFFSET_MINUTES: {raw}"))?;
    UtcOffset::from_whole_seconds(minutes * 60)
        .with_context(|| format!("MEAL_CLOCK_UTC_OFFSET_MINUTES out of range: {raw}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_and_negative_offsets() {
        let ist = parse_offset_minutes("330").expect("valid offset");
        assert_eq!(ist.whole_hours(), 5);
        assert_eq!(ist.minutes_past_hour(), 30);

        let pst = parse_offset_minutes(" -480 ").expect("valid offset");
        assert_eq!(pst.whole_hours(), -8);
    }

    #[test]
    fn rejects_garbage_and_out_of_range_offsets() {
        assert!(parse_offset_minutes("five").is_err());
        assert!(parse_offset_minutes("100000").is_err());
    }
}
