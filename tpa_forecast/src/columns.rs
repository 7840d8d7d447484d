//! Names of the columns produced and consumed by the pipeline

/// Observed (or placeholder) price
pub const PRICE: &str = "price";
/// Calendar date of the timestamp
pub const DAY: &str = "day";
/// Weekday, 0 = Monday
pub const DAY_OF_WEEK: &str = "day_of_week";
/// Hour in half-hour steps
pub const HOUR: &str = "hour";
/// `HH:MM` label
pub const HOUR_FORMAT: &str = "hour_format";
/// Days since the first day of the table
pub const TREND: &str = "trend";
/// `%Y-%W` label
pub const WEEK: &str = "week";
/// Mean price of the previous day
pub const AVG_DAILY_PRICE_LAG1: &str = "avg_daily_price_lag1";
/// Mean price two days back
pub const AVG_DAILY_PRICE_LAG2: &str = "avg_daily_price_lag2";
/// Mean price three days back
pub const AVG_DAILY_PRICE_LAG3: &str = "avg_daily_price_lag3";
/// Flags the rows of the latest day
pub const IS_LAST: &str = "is_last";
/// Prediction written by the forecast runner
pub const PRED: &str = "pred";

/// Daily lag columns, ordered by lag
pub const AVG_DAILY_PRICE_LAGS: [&str; 3] = [
    AVG_DAILY_PRICE_LAG1,
    AVG_DAILY_PRICE_LAG2,
    AVG_DAILY_PRICE_LAG3,
];
