pub mod app;
pub mod auth;
pub mod bills;
pub mod categories;
pub mod dashboard;
pub mod metrics;
pub mod organization;
pub mod profile;
pub mod students;
pub mod template;

use chrono::{Local, NaiveDate};

/// Today's date in the server's local time zone, as printed on bills.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// One `<option>` of a select box, with its selection worked out up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub selected: bool,
}

pub(crate) fn select_options<I, S>(values: I, current: &str) -> Vec<SelectOption>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values
        .into_iter()
        .map(|value| {
            let value = value.into();
            SelectOption {
                selected: value == current,
                value,
            }
        })
        .collect()
}
