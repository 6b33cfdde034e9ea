/// Pattern of the timestamps in the remote schedule export.
pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Time zone the convention's wire timestamps are written in.
pub const DEFAULT_TIMEZONE: &str = "America/Chicago";

pub const DEFAULT_DATA_DIR: &str = "~/.local/share/consched";

/// Environment variable prefix for config overrides (`CONSCHED_ENDPOINT__BASE_URL`).
pub const ENV_PREFIX: &str = "CONSCHED";
