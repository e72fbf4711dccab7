#![forbid(unsafe_code)]

//! Date-range filter over the optional item expiration date.
//!
//! The filter is driven entirely by query parameters (`expiration__gte`, `expiration__lt`,
//! `expiration__isnull`). Each display choice is a fixed parameter set; a choice is selected
//! when the active `expiration__*` parameters equal its set exactly.

use std::collections::BTreeMap;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime};

pub const FIELD_PREFIX: &str = "expiration__";
pub const PARAM_SINCE: &str = "expiration__gte";
pub const PARAM_UNTIL: &str = "expiration__lt";
pub const PARAM_ISNULL: &str = "expiration__isnull";

/// Width of the "expires this month" window.
pub const SOON_WINDOW_DAYS: i64 = 30;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpirationError {
    #[error("incorrect lookup parameter {param}={value:?}")]
    IncorrectLookup { param: String, value: String },
}

/// Today's date in the local time zone, falling back to UTC when the offset is unknown.
pub fn today_local() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), DATE_FORMAT).ok()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpirationChoice {
    Any,
    Expired,
    ExpiresThisMonth,
    ExpiresLater,
    DoesNotExpire,
    Expires,
}

impl ExpirationChoice {
    pub const ALL: [ExpirationChoice; 6] = [
        ExpirationChoice::Any,
        ExpirationChoice::Expired,
        ExpirationChoice::ExpiresThisMonth,
        ExpirationChoice::ExpiresLater,
        ExpirationChoice::DoesNotExpire,
        ExpirationChoice::Expires,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ExpirationChoice::Any => "Any",
            ExpirationChoice::Expired => "Expired",
            ExpirationChoice::ExpiresThisMonth => "Expires this month",
            ExpirationChoice::ExpiresLater => "Expires later",
            ExpirationChoice::DoesNotExpire => "Does not expire",
            ExpirationChoice::Expires => "Expires",
        }
    }

    /// The exact `expiration__*` parameters this choice stands for, relative to `today`.
    pub fn params(self, today: Date) -> BTreeMap<String, String> {
        let next_month = today + Duration::days(SOON_WINDOW_DAYS);
        let pairs: Vec<(&str, String)> = match self {
            ExpirationChoice::Any => Vec::new(),
            ExpirationChoice::Expired => vec![(PARAM_UNTIL, format_date(today))],
            ExpirationChoice::ExpiresThisMonth => vec![
                (PARAM_SINCE, format_date(today)),
                (PARAM_UNTIL, format_date(next_month)),
            ],
            ExpirationChoice::ExpiresLater => vec![(PARAM_SINCE, format_date(next_month))],
            ExpirationChoice::DoesNotExpire => vec![(PARAM_ISNULL, "True".to_string())],
            ExpirationChoice::Expires => vec![(PARAM_ISNULL, "False".to_string())],
        };
        pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExpirationBounds {
    pub since: Option<Date>,
    pub until: Option<Date>,
    pub is_null: Option<bool>,
}

impl ExpirationBounds {
    pub fn matches(&self, expiration: Option<Date>) -> bool {
        if let Some(is_null) = self.is_null
            && is_null != expiration.is_none()
        {
            return false;
        }
        if self.since.is_none() && self.until.is_none() {
            return true;
        }
        let Some(date) = expiration else {
            return false;
        };
        self.since.is_none_or(|since| date >= since) && self.until.is_none_or(|until| date < until)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceView {
    pub choice: ExpirationChoice,
    pub display: &'static str,
    pub selected: bool,
    /// Full query for the choice link: the active parameters with every `expiration__*` key
    /// replaced by the choice's own set.
    pub params: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpirationFilter {
    today: Date,
    date_params: BTreeMap<String, String>,
    bounds: ExpirationBounds,
}

impl ExpirationFilter {
    /// Picks the `expiration__*` entries out of `params` and validates them. Unknown
    /// `expiration__` lookups and malformed values are rejected.
    pub fn new(today: Date, params: &BTreeMap<String, String>) -> Result<Self, ExpirationError> {
        let date_params = params
            .iter()
            .filter(|(key, _)| key.starts_with(FIELD_PREFIX))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect::<BTreeMap<_, _>>();

        let mut bounds = ExpirationBounds::default();
        for (key, value) in &date_params {
            let incorrect = || ExpirationError::IncorrectLookup {
                param: key.clone(),
                value: value.clone(),
            };
            match key.as_str() {
                PARAM_SINCE => bounds.since = Some(parse_date(value).ok_or_else(incorrect)?),
                PARAM_UNTIL => bounds.until = Some(parse_date(value).ok_or_else(incorrect)?),
                PARAM_ISNULL => bounds.is_null = Some(parse_lookup_bool(value).ok_or_else(incorrect)?),
                _ => return Err(incorrect()),
            }
        }

        Ok(Self {
            today,
            date_params,
            bounds,
        })
    }

    pub fn matches(&self, expiration: Option<Date>) -> bool {
        self.bounds.matches(expiration)
    }

    /// The choice whose parameter set equals the active one, if any.
    pub fn selected(&self) -> Option<ExpirationChoice> {
        ExpirationChoice::ALL
            .into_iter()
            .find(|choice| choice.params(self.today) == self.date_params)
    }

    pub fn choices(&self, active: &BTreeMap<String, String>) -> Vec<ChoiceView> {
        let selected = self.selected();
        ExpirationChoice::ALL
            .into_iter()
            .map(|choice| {
                let mut params = active
                    .iter()
                    .filter(|(key, _)| !key.starts_with(FIELD_PREFIX))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect::<BTreeMap<_, _>>();
                params.extend(choice.params(self.today));
                ChoiceView {
                    choice,
                    display: choice.title(),
                    selected: selected == Some(choice),
                    params,
                }
            })
            .collect()
    }
}

fn parse_lookup_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "True" | "true" | "1" => Some(true),
        "False" | "false" | "0" => Some(false),
        _ => None,
    }
}
