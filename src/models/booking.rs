use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::seat::SeatLabel;

/// Everything needed to write one booking and its seats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub user_id: i64,
    pub showtime_id: i64,
    pub total: Decimal,
    pub seats: Vec<SeatLabel>,
}

/// What the store hands back after a booking commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingReceipt {
    pub booking_id: i64,
    pub reference: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ClearedBookings {
    pub bookings_deleted: u64,
    pub seats_released: u64,
}

/// Details handed to the ticket renderer once a booking is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct TicketDetails {
    pub booking_id: i64,
    pub reference: Uuid,
    pub movie_title: String,
    pub room_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub seats: Vec<String>,
    #[schemars(with = "String")]
    pub total: Decimal,
}

impl TicketDetails {
    /// Content encoded into the ticket's QR code.
    pub fn qr_payload(&self) -> String {
        format!("CINEMA-TICKET:{}", self.reference)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BookingRequest {
    pub showtime_id: i64,
    pub seats: Vec<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct BookingResponse {
    pub ticket: TicketDetails,
    pub qr_payload: String,
}

// Single booking in BookingHistoryResponse
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct BookingHistoryDetail {
    pub booking_id: i64,
    pub reference: Uuid,
    pub movie_title: String,
    pub room_id: i64,
    pub start_time: NaiveDateTime,
    pub seats: Vec<String>,
    #[schemars(with = "String")]
    pub total: Decimal,
    pub booked_at: NaiveDateTime,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct BookingHistoryResponse {
    pub bookings: Vec<BookingHistoryDetail>,
}
