//! Calendar date utilities.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{fmt, str::FromStr};

#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{format_description::BorrowedFormatItem, macros::format_description};

/// Textual format of a [`Date`] (`YYYY-MM-DD`).
const FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Civil calendar date without a time-of-day component.
///
/// All the calendar arithmetic is timezone-agnostic, while [`Date::today()`]
/// anchors to UTC.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Date(time::Date);

impl Date {
    /// Returns the current [`Date`] in UTC.
    #[must_use]
    pub fn today() -> Self {
        Self(time::OffsetDateTime::now_utc().date())
    }

    /// Creates a new [`Date`] from the provided `YYYY-MM-DD` string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid `YYYY-MM-DD` date.
    pub fn from_iso8601(input: &str) -> Result<Self, time::error::Parse> {
        time::Date::parse(input, FORMAT).map(Self)
    }

    /// Returns this [`Date`] as a `YYYY-MM-DD` string.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn to_iso8601(self) -> String {
        self.0.format(FORMAT).unwrap_or_else(|e| {
            panic!("cannot format `Date` as `YYYY-MM-DD`: {e}")
        })
    }

    /// Returns the [`Date`] preceding this one.
    ///
    /// [`None`] is returned if the result underflows the calendar.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        self.0.previous_day().map(Self)
    }

    /// Returns the [`Date`] laying the provided number of days before this
    /// one.
    ///
    /// [`None`] is returned if the result underflows the calendar.
    #[must_use]
    pub fn minus_days(self, days: u16) -> Option<Self> {
        self.0
            .checked_sub(time::Duration::days(i64::from(days)))
            .map(Self)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_iso8601())
    }
}

impl FromStr for Date {
    type Err = time::error::Parse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_iso8601(s)
    }
}

impl From<time::Date> for Date {
    fn from(date: time::Date) -> Self {
        Self(date)
    }
}

impl From<Date> for time::Date {
    fn from(date: Date) -> Self {
        date.0
    }
}

#[cfg(feature = "postgres")]
impl FromSql<'_> for Date {
    accepts!(DATE);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::Date::from_sql(ty, raw).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl ToSql for Date {
    accepts!(DATE);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, w)
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Calendar date in a `YYYY-MM-DD` format.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Date = super::Date;

    impl Date {
        fn to_output<S: ScalarValue>(date: &Date) -> Value<S> {
            Value::scalar(date.to_iso8601())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Date` input scalar from non-string \
                         value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_iso8601(s).map_err(|e| {
                        format!("Cannot parse `Date` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use super::Date;

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_formats_iso8601() {
        assert_eq!(date("2025-03-01").to_string(), "2025-03-01");
        assert_eq!(date("1970-01-01").to_string(), "1970-01-01");

        assert!(Date::from_iso8601("2025-13-01").is_err());
        assert!(Date::from_iso8601("2025-02-30").is_err());
        assert!(Date::from_iso8601("03/01/2025").is_err());
        assert!(Date::from_iso8601("garbage").is_err());
    }

    #[test]
    fn subtracts_days_across_boundaries() {
        assert_eq!(date("2025-03-02").minus_days(1), Some(date("2025-03-01")));
        assert_eq!(date("2025-03-01").minus_days(1), Some(date("2025-02-28")));
        assert_eq!(date("2024-03-01").minus_days(1), Some(date("2024-02-29")));
        assert_eq!(date("2025-01-01").minus_days(1), Some(date("2024-12-31")));
        assert_eq!(date("2025-01-10").minus_days(10), Some(date("2024-12-31")));
        assert_eq!(date("2025-01-10").minus_days(0), Some(date("2025-01-10")));
    }

    #[test]
    fn previous_is_one_day_back() {
        assert_eq!(
            date("2025-06-15").previous(),
            date("2025-06-15").minus_days(1),
        );
        assert_eq!(date("2025-01-01").previous(), Some(date("2024-12-31")));
    }

    #[test]
    fn orders_chronologically() {
        assert!(date("2025-01-02") > date("2025-01-01"));
        assert!(date("2024-12-31") < date("2025-01-01"));
        assert_eq!(date("2025-01-01"), date("2025-01-01"));
    }
}
