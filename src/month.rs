// Month labels as an ordered categorical.
//
// Variant order is calendar order, so the derived `Ord` is the only ordering
// used anywhere a month is sorted or used as a pivot axis.
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Month {
    Jan,
    Fev,
    Mar,
    Abr,
    Mai,
    Jun,
    Jul,
    Ago,
    Set,
    Out,
    Nov,
    Dez,
}

pub const MONTH_COUNT: usize = 12;

impl Month {
    /// Maps a calendar month number (1-12) to its label.
    pub fn from_number(n: u32) -> Option<Self> {
        match n {
            1..=12 => Month::iter().nth(n as usize - 1),
            _ => None,
        }
    }

    /// Calendar month number, 1-12.
    pub fn number(self) -> u32 {
        self.index() as u32 + 1
    }

    /// Zero-based position in calendar order.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Fev => "Fev",
            Month::Mar => "Mar",
            Month::Abr => "Abr",
            Month::Mai => "Mai",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Ago => "Ago",
            Month::Set => "Set",
            Month::Out => "Out",
            Month::Nov => "Nov",
            Month::Dez => "Dez",
        }
    }

    /// All twelve months in calendar order.
    pub fn all() -> impl Iterator<Item = Month> {
        Month::iter()
    }
}
