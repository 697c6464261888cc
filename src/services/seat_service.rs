use crate::models::movie::Showtime;
use crate::models::seat::{
    Availability, QuoteResponse, SeatLabel, SeatMap, SeatMapResponse, SeatView, SeatingPlan,
};
use crate::services::store::BookingStore;
use crate::utils::error::{AppError, AppResult};
use rust_decimal::Decimal;
use tracing::warn;

/// Seat availability and pricing for one hall layout.
#[derive(Debug, Clone, Default)]
pub struct SeatService {
    plan: SeatingPlan,
}

impl SeatService {
    pub fn new(plan: SeatingPlan) -> Self {
        SeatService { plan }
    }

    pub fn plan(&self) -> &SeatingPlan {
        &self.plan
    }

    /// Asks the store which seats are gone. A store failure yields
    /// `Availability::Unknown` rather than an all-available map.
    pub async fn resolve<S>(&self, store: &S, showtime_id: i64) -> Availability
    where
        S: BookingStore + ?Sized,
    {
        match store.list_taken_seats(showtime_id).await {
            Ok(taken) => Availability::Resolved(self.plan.seat_map(&taken)),
            Err(e) => {
                warn!(showtime_id, error = %e, "Could not resolve seat availability");
                Availability::Unknown
            }
        }
    }

    pub fn price<'a, I>(&self, seats: I, base_price: Decimal) -> Decimal
    where
        I: IntoIterator<Item = &'a SeatLabel>,
    {
        self.plan.price(seats, base_price)
    }

    pub fn quote(&self, showtime: &Showtime, raw_seats: &[String]) -> AppResult<QuoteResponse> {
        let seats = self
            .plan
            .parse_selection(raw_seats)
            .map_err(AppError::ValidationError)?;
        let total = self.price(&seats, showtime.price);

        Ok(QuoteResponse {
            showtime_id: showtime.id,
            seats: seats.iter().map(|seat| seat.to_string()).collect(),
            total,
        })
    }

    pub fn seat_map_response(&self, showtime: &Showtime, map: &SeatMap) -> SeatMapResponse {
        let seats = map
            .iter()
            .map(|(label, status)| SeatView {
                label: label.to_string(),
                row: label.row_letter().to_string(),
                column: label.column(),
                status: *status,
                premium: self.plan.is_premium(label),
                price: self.plan.seat_price(label, showtime.price),
            })
            .collect();

        SeatMapResponse {
            showtime_id: showtime.id,
            rows: self.plan.rows,
            columns: self.plan.columns,
            available: map.available_count(),
            seats,
        }
    }
}
