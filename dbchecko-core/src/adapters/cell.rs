//! Text rendering of decoded column values.

use base64::Engine;

/// Converts a decoded database value into its table text.
pub(crate) trait CellText {
    fn into_cell(self) -> String;
}

macro_rules! display_cell {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl CellText for $ty {
                fn into_cell(self) -> String {
                    self.to_string()
                }
            }
        )+
    };
}

display_cell!(
    i16,
    i32,
    i64,
    u64,
    f32,
    f64,
    bool,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
    chrono::NaiveDate,
    chrono::NaiveTime,
    uuid::Uuid,
);

#[cfg(any(feature = "postgresql", feature = "mysql"))]
display_cell!(sqlx::types::BigDecimal, sqlx::types::JsonValue);

impl CellText for String {
    fn into_cell(self) -> String {
        self
    }
}

impl CellText for Vec<u8> {
    fn into_cell(self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self);
        format!("base64:{encoded}")
    }
}

#[cfg(feature = "postgresql")]
impl CellText for sqlx::postgres::types::Oid {
    fn into_cell(self) -> String {
        self.0.to_string()
    }
}

/// Renders an interval the way PostgreSQL's default `IntervalStyle` prints
/// it, e.g. `1 year 2 mons 3 days 04:05:06.5`.
#[cfg(feature = "postgresql")]
impl CellText for sqlx::postgres::types::PgInterval {
    fn into_cell(self) -> String {
        let mut parts = Vec::new();
        push_interval_unit(&mut parts, self.months.wrapping_div(12), "year");
        push_interval_unit(&mut parts, self.months.wrapping_rem(12), "mon");
        push_interval_unit(&mut parts, self.days, "day");
        if self.microseconds != 0 || parts.is_empty() {
            parts.push(interval_clock(self.microseconds));
        }
        parts.join(" ")
    }
}

#[cfg(feature = "postgresql")]
fn push_interval_unit(parts: &mut Vec<String>, amount: i32, unit: &str) {
    match amount {
        0 => {}
        1 => parts.push(format!("1 {unit}")),
        _ => parts.push(format!("{amount} {unit}s")),
    }
}

#[cfg(feature = "postgresql")]
fn interval_clock(microseconds: i64) -> String {
    const MICROS_PER_SECOND: u64 = 1_000_000;

    let sign = if microseconds < 0 { "-" } else { "" };
    let total = microseconds.unsigned_abs();
    let seconds = total.wrapping_div(MICROS_PER_SECOND);
    let fraction = total.wrapping_rem(MICROS_PER_SECOND);

    let clock = format!(
        "{sign}{:02}:{:02}:{:02}",
        seconds.wrapping_div(3600),
        seconds.wrapping_rem(3600).wrapping_div(60),
        seconds.wrapping_rem(60)
    );
    if fraction == 0 {
        clock
    } else {
        let digits = format!("{fraction:06}");
        format!("{clock}.{}", digits.trim_end_matches('0'))
    }
}
