use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::models::booking::TicketDetails;
use crate::models::movie::Showtime;
use crate::models::seat::Availability;

/// State changes the booking screens render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    DatesLoaded(Vec<NaiveDate>),
    TimesLoaded(Vec<Showtime>),
    SeatMapLoaded {
        showtime_id: i64,
        availability: Availability,
    },
    PriceChanged(Decimal),
    ConfirmEnabled(bool),
    BookingSucceeded(TicketDetails),
    BookingFailed(String),
    LoginRequired,
    /// The store could not be reached; the screen should block.
    Unavailable(String),
}

/// Receives workflow events. Implemented by whatever draws the screens.
pub trait Presenter {
    fn present(&mut self, event: WorkflowEvent);
}

/// Keeps every event in order. Used by request handlers and tests.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    events: Vec<WorkflowEvent>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[WorkflowEvent] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<WorkflowEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn last(&self) -> Option<&WorkflowEvent> {
        self.events.last()
    }
}

impl Presenter for RecordingPresenter {
    fn present(&mut self, event: WorkflowEvent) {
        self.events.push(event);
    }
}

/// Writes each event to the log; handy for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPresenter;

impl Presenter for TracingPresenter {
    fn present(&mut self, event: WorkflowEvent) {
        match event {
            WorkflowEvent::DatesLoaded(dates) => info!(count = dates.len(), "Show dates loaded"),
            WorkflowEvent::TimesLoaded(times) => {
                for showtime in &times {
                    debug!(showtime_id = showtime.id, "{}", showtime.display_label());
                }
                info!(count = times.len(), "Show times loaded");
            }
            WorkflowEvent::SeatMapLoaded {
                showtime_id,
                availability,
            } => match availability.seat_map() {
                Some(map) => info!(showtime_id, available = map.available_count(), "Seat map loaded"),
                None => warn!(showtime_id, "Seat map unavailable"),
            },
            WorkflowEvent::PriceChanged(total) => info!(%total, "Price changed"),
            WorkflowEvent::ConfirmEnabled(enabled) => debug!(enabled, "Confirm toggled"),
            WorkflowEvent::BookingSucceeded(ticket) => info!(
                booking_id = ticket.booking_id,
                reference = %ticket.reference,
                seats = ?ticket.seats,
                total = %ticket.total,
                "Ticket issued"
            ),
            WorkflowEvent::BookingFailed(reason) => warn!(%reason, "Booking failed"),
            WorkflowEvent::LoginRequired => warn!("Login required to book"),
            WorkflowEvent::Unavailable(message) => warn!(%message, "Booking service unavailable"),
        }
    }
}

// Events for a UI thread; a closed receiver just drops them
impl Presenter for UnboundedSender<WorkflowEvent> {
    fn present(&mut self, event: WorkflowEvent) {
        if self.send(event).is_err() {
            debug!("Presenter channel closed, dropping event");
        }
    }
}
