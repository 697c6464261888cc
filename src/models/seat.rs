use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A seat on the hall grid, e.g. `F7` is row index 5, column 7.
///
/// Rows are letters starting at `A`, columns are 1-based. Ordering is row
/// first, then column, which is also the order tickets list seats in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeatLabel {
    row: u8,
    column: u8,
}

impl SeatLabel {
    pub fn new(row: u8, column: u8) -> Option<Self> {
        if row >= 26 || column == 0 {
            return None;
        }
        Some(SeatLabel { row, column })
    }

    /// Zero-based row index (`A` = 0).
    pub fn row(&self) -> u8 {
        self.row
    }

    /// One-based column number.
    pub fn column(&self) -> u8 {
        self.column
    }

    pub fn row_letter(&self) -> char {
        (b'A' + self.row) as char
    }
}

impl fmt::Display for SeatLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_letter(), self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a seat label (expected a row letter followed by a column number, e.g. F7)")]
pub struct ParseSeatLabelError(pub String);

impl FromStr for SeatLabel {
    type Err = ParseSeatLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let letter = chars
            .next()
            .filter(|c| c.is_ascii_alphabetic())
            .ok_or_else(|| ParseSeatLabelError(s.to_string()))?;
        let digits = chars.as_str();
        // Plain decimal columns only: no sign, no leading zero
        if !digits.starts_with(|c: char| ('1'..='9').contains(&c))
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ParseSeatLabelError(s.to_string()));
        }
        let column: u8 = digits
            .parse()
            .map_err(|_| ParseSeatLabelError(s.to_string()))?;
        let row = letter.to_ascii_uppercase() as u8 - b'A';
        SeatLabel::new(row, column).ok_or_else(|| ParseSeatLabelError(s.to_string()))
    }
}

impl Serialize for SeatLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SeatLabel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// Seat Status Enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatStatus {
    Available,
    Taken,
}

/// Hall layout and the pricing rule that goes with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatingPlan {
    pub rows: u8,
    pub columns: u8,
    /// Rows with an index at or above this one carry the surcharge.
    pub premium_from_row: u8,
    pub premium_surcharge: Decimal,
}

impl Default for SeatingPlan {
    fn default() -> Self {
        SeatingPlan {
            rows: 8,
            columns: 10,
            premium_from_row: 6,
            premium_surcharge: Decimal::new(500, 2),
        }
    }
}

impl SeatingPlan {
    pub fn contains(&self, seat: &SeatLabel) -> bool {
        seat.row < self.rows && seat.column >= 1 && seat.column <= self.columns
    }

    pub fn is_premium(&self, seat: &SeatLabel) -> bool {
        seat.row >= self.premium_from_row
    }

    pub fn capacity(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    /// Every seat on the grid, row by row.
    pub fn labels(&self) -> impl Iterator<Item = SeatLabel> + '_ {
        (0..self.rows).flat_map(move |row| (1..=self.columns).map(move |column| SeatLabel { row, column }))
    }

    pub fn seat_price(&self, seat: &SeatLabel, base_price: Decimal) -> Decimal {
        if self.is_premium(seat) {
            base_price + self.premium_surcharge
        } else {
            base_price
        }
    }

    /// Total for a selection. Depends only on which seats are in it.
    pub fn price<'a, I>(&self, seats: I, base_price: Decimal) -> Decimal
    where
        I: IntoIterator<Item = &'a SeatLabel>,
    {
        seats
            .into_iter()
            .map(|seat| self.seat_price(seat, base_price))
            .sum()
    }

    /// Builds the full status map; `taken` entries outside the grid are ignored.
    pub fn seat_map(&self, taken: &[SeatLabel]) -> SeatMap {
        let mut seats: BTreeMap<SeatLabel, SeatStatus> = self
            .labels()
            .map(|label| (label, SeatStatus::Available))
            .collect();
        for label in taken {
            if let Some(status) = seats.get_mut(label) {
                *status = SeatStatus::Taken;
            }
        }
        SeatMap { seats }
    }

    /// Parses and checks a list of labels against the grid, rejecting duplicates.
    pub fn parse_selection<S: AsRef<str>>(&self, raw: &[S]) -> Result<Vec<SeatLabel>, String> {
        let mut seats = Vec::with_capacity(raw.len());
        for item in raw {
            let label: SeatLabel = item.as_ref().parse().map_err(|e: ParseSeatLabelError| e.to_string())?;
            if !self.contains(&label) {
                return Err(format!("Seat {} is not in this hall", label));
            }
            if seats.contains(&label) {
                return Err(format!("Seat {} was requested twice", label));
            }
            seats.push(label);
        }
        seats.sort();
        Ok(seats)
    }
}

/// Status of every seat for one showtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatMap {
    seats: BTreeMap<SeatLabel, SeatStatus>,
}

impl SeatMap {
    pub fn status(&self, seat: &SeatLabel) -> Option<SeatStatus> {
        self.seats.get(seat).copied()
    }

    pub fn is_available(&self, seat: &SeatLabel) -> bool {
        self.status(seat) == Some(SeatStatus::Available)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SeatLabel, &SeatStatus)> {
        self.seats.iter()
    }

    pub fn taken(&self) -> Vec<SeatLabel> {
        self.seats
            .iter()
            .filter(|(_, status)| **status == SeatStatus::Taken)
            .map(|(label, _)| *label)
            .collect()
    }

    pub fn available_count(&self) -> usize {
        self.seats
            .values()
            .filter(|status| **status == SeatStatus::Available)
            .count()
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
}

/// Result of asking the store which seats are taken.
///
/// `Unknown` means the store could not be reached; nothing is orderable then.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Resolved(SeatMap),
    Unknown,
}

impl Availability {
    pub fn seat_map(&self) -> Option<&SeatMap> {
        match self {
            Availability::Resolved(map) => Some(map),
            Availability::Unknown => None,
        }
    }
}

// Single seat in a seat map response
#[derive(Debug, Serialize, JsonSchema)]
pub struct SeatView {
    pub label: String,
    pub row: String,
    pub column: u8,
    pub status: SeatStatus,
    pub premium: bool,
    #[schemars(with = "String")]
    pub price: Decimal,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct SeatMapResponse {
    pub showtime_id: i64,
    pub rows: u8,
    pub columns: u8,
    pub available: usize,
    pub seats: Vec<SeatView>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct QuoteRequest {
    pub seats: Vec<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct QuoteResponse {
    pub showtime_id: i64,
    pub seats: Vec<String>,
    #[schemars(with = "String")]
    pub total: Decimal,
}
