//! The booking screens as a state machine: date, time, seats, ticket.
//!
//! A [`BookingWorkflow`] belongs to one person at one screen. It is driven by
//! user intents (`select_date`, `select_time`, `toggle_seat`, `confirm`),
//! reaches storage only through [`BookingStore`] and reports every visible
//! change to a [`Presenter`].

pub mod events;

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::models::booking::{NewBooking, TicketDetails};
use crate::models::movie::{Movie, Showtime};
use crate::models::seat::{Availability, SeatLabel, SeatingPlan};
use crate::models::user::Session;
use crate::services::seat_service::SeatService;
use crate::services::store::BookingStore;
use crate::utils::error::{AppError, AppResult};

pub use events::{Presenter, RecordingPresenter, TracingPresenter, WorkflowEvent};

/// Seats picked on the map for one showtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatSelection {
    pub date: NaiveDate,
    pub showtimes: Vec<Showtime>,
    pub showtime: Showtime,
    pub availability: Availability,
    pub selected: BTreeSet<SeatLabel>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    SelectingDate {
        dates: Vec<NaiveDate>,
    },
    SelectingTime {
        date: NaiveDate,
        showtimes: Vec<Showtime>,
    },
    ViewingSeatMap(SeatSelection),
    /// Terminal: the booking committed.
    Ticketed(TicketDetails),
    /// Terminal: a guest tried to confirm. Start a new workflow after login.
    LoginRequired,
}

impl WorkflowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Ticketed(_) | WorkflowState::LoginRequired)
    }

    fn name(&self) -> &'static str {
        match self {
            WorkflowState::SelectingDate { .. } => "selecting date",
            WorkflowState::SelectingTime { .. } => "selecting time",
            WorkflowState::ViewingSeatMap(_) => "viewing seat map",
            WorkflowState::Ticketed(_) => "ticketed",
            WorkflowState::LoginRequired => "login required",
        }
    }
}

/// What a successful call to [`BookingWorkflow::confirm`] led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Ticketed(TicketDetails),
    LoginRequired,
}

pub struct BookingWorkflow<S, P> {
    store: S,
    presenter: P,
    session: Session,
    movie: Movie,
    seats: SeatService,
    state: WorkflowState,
}

impl<S: BookingStore, P: Presenter> BookingWorkflow<S, P> {
    pub fn new(store: S, presenter: P, session: Session, movie: Movie, plan: SeatingPlan) -> Self {
        BookingWorkflow {
            store,
            presenter,
            session,
            movie,
            seats: SeatService::new(plan),
            state: WorkflowState::SelectingDate { dates: Vec::new() },
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn movie(&self) -> &Movie {
        &self.movie
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn into_presenter(self) -> P {
        self.presenter
    }

    pub fn selected(&self) -> Option<&BTreeSet<SeatLabel>> {
        match &self.state {
            WorkflowState::ViewingSeatMap(selection) => Some(&selection.selected),
            _ => None,
        }
    }

    pub fn availability(&self) -> Option<&Availability> {
        match &self.state {
            WorkflowState::ViewingSeatMap(selection) => Some(&selection.availability),
            _ => None,
        }
    }

    /// Current total for the selection, `None` outside the seat map.
    pub fn total(&self) -> Option<Decimal> {
        match &self.state {
            WorkflowState::ViewingSeatMap(selection) => {
                Some(self.seats.price(&selection.selected, selection.showtime.price))
            }
            _ => None,
        }
    }

    pub fn confirm_enabled(&self) -> bool {
        match &self.state {
            WorkflowState::ViewingSeatMap(selection) => {
                selection.availability.seat_map().is_some() && !selection.selected.is_empty()
            }
            _ => false,
        }
    }

    /// Lists the days this movie is on and (re)enters the date picker.
    pub async fn load_dates(&mut self) -> AppResult<&[NaiveDate]> {
        self.ensure_active("load dates")?;

        let dates = match self.store.list_dates(self.movie.id).await {
            Ok(dates) => dates,
            Err(e) => return Err(self.report_unavailable(e)),
        };
        debug!(movie_id = self.movie.id, count = dates.len(), "Dates loaded");

        self.presenter.present(WorkflowEvent::DatesLoaded(dates.clone()));
        self.state = WorkflowState::SelectingDate { dates };

        match &self.state {
            WorkflowState::SelectingDate { dates } => Ok(dates),
            _ => Ok(&[]),
        }
    }

    /// Loads the showtimes on `date`, dropping any seat selection.
    pub async fn select_date(&mut self, date: NaiveDate) -> AppResult<&[Showtime]> {
        self.ensure_active("select a date")?;

        let showtimes = match self.store.list_showtimes(self.movie.id, date).await {
            Ok(showtimes) => showtimes,
            Err(e) => return Err(self.report_unavailable(e)),
        };
        debug!(movie_id = self.movie.id, %date, count = showtimes.len(), "Times loaded");

        self.presenter.present(WorkflowEvent::TimesLoaded(showtimes.clone()));
        self.presenter.present(WorkflowEvent::ConfirmEnabled(false));
        self.state = WorkflowState::SelectingTime { date, showtimes };

        match &self.state {
            WorkflowState::SelectingTime { showtimes, .. } => Ok(showtimes),
            _ => Ok(&[]),
        }
    }

    /// Opens the seat map for one of the showtimes listed for the chosen date.
    pub async fn select_time(&mut self, showtime_id: i64) -> AppResult<()> {
        let (date, showtimes) = match &self.state {
            WorkflowState::SelectingTime { date, showtimes } => (*date, showtimes.clone()),
            WorkflowState::ViewingSeatMap(selection) => (selection.date, selection.showtimes.clone()),
            other => return Err(rejected("select a time", other)),
        };

        let showtime = showtimes
            .iter()
            .find(|showtime| showtime.id == showtime_id)
            .cloned()
            .ok_or_else(|| {
                AppError::ValidationError(format!("Showtime {} is not on {}", showtime_id, date))
            })?;

        let availability = self.seats.resolve(&self.store, showtime.id).await;
        self.state = WorkflowState::ViewingSeatMap(SeatSelection {
            date,
            showtimes,
            showtime,
            availability,
            selected: BTreeSet::new(),
        });
        self.present_seat_map();
        Ok(())
    }

    /// Adds or removes one seat and returns the new total.
    ///
    /// Taken seats and seats outside the hall cannot be added. Nothing can be
    /// toggled while availability is unknown.
    pub fn toggle_seat(&mut self, seat: SeatLabel) -> AppResult<Decimal> {
        let selection = match &mut self.state {
            WorkflowState::ViewingSeatMap(selection) => selection,
            other => return Err(rejected("pick seats", other)),
        };

        let map = match selection.availability.seat_map() {
            Some(map) => map,
            None => {
                return Err(AppError::ConnectionUnavailable(
                    "Seat availability is unknown".into(),
                ))
            }
        };
        if !self.seats.plan().contains(&seat) {
            return Err(AppError::ValidationError(format!("Seat {} is not in this hall", seat)));
        }

        if !selection.selected.remove(&seat) {
            if !map.is_available(&seat) {
                return Err(AppError::ValidationError(format!("Seat {} is already taken", seat)));
            }
            selection.selected.insert(seat);
        }

        let total = self.seats.price(&selection.selected, selection.showtime.price);
        let enabled = !selection.selected.is_empty();
        self.presenter.present(WorkflowEvent::PriceChanged(total));
        self.presenter.present(WorkflowEvent::ConfirmEnabled(enabled));
        Ok(total)
    }

    /// Books the selected seats in one atomic store call.
    ///
    /// A guest never reaches the store: the workflow ends in `LoginRequired`.
    /// If the store refuses the booking, the seat map is reloaded, the
    /// selection is cleared and the error is returned.
    pub async fn confirm(&mut self) -> AppResult<ConfirmOutcome> {
        let (showtime, seats) = match &self.state {
            WorkflowState::ViewingSeatMap(selection) => {
                if selection.selected.is_empty() {
                    return Err(AppError::ValidationError("Select at least one seat".into()));
                }
                if selection.availability.seat_map().is_none() {
                    return Err(AppError::ConnectionUnavailable(
                        "Seat availability is unknown".into(),
                    ));
                }
                (
                    selection.showtime.clone(),
                    selection.selected.iter().copied().collect::<Vec<_>>(),
                )
            }
            other => return Err(rejected("confirm", other)),
        };

        let user_id = match self.session.booking_user() {
            Some(user_id) => user_id,
            None => {
                info!(showtime_id = showtime.id, "Guest tried to book, login required");
                self.state = WorkflowState::LoginRequired;
                self.presenter.present(WorkflowEvent::LoginRequired);
                return Ok(ConfirmOutcome::LoginRequired);
            }
        };

        let total = self.seats.price(&seats, showtime.price);
        let booking = NewBooking {
            user_id,
            showtime_id: showtime.id,
            total,
            seats: seats.clone(),
        };

        match self.store.create_booking(booking).await {
            Ok(receipt) => {
                let ticket = TicketDetails {
                    booking_id: receipt.booking_id,
                    reference: receipt.reference,
                    movie_title: self.movie.title.clone(),
                    room_id: showtime.room_id,
                    date: showtime.date(),
                    time: showtime.start_time.time(),
                    seats: seats.iter().map(|seat| seat.to_string()).collect(),
                    total,
                };
                self.state = WorkflowState::Ticketed(ticket.clone());
                self.presenter.present(WorkflowEvent::BookingSucceeded(ticket.clone()));
                Ok(ConfirmOutcome::Ticketed(ticket))
            }
            Err(e) => {
                warn!(
                    showtime_id = showtime.id,
                    user_id,
                    error = %e,
                    "Booking failed, reloading seat map"
                );
                self.presenter.present(WorkflowEvent::BookingFailed(e.user_message()));
                self.reload_seat_map().await;
                Err(e)
            }
        }
    }

    async fn reload_seat_map(&mut self) {
        let showtime_id = match &self.state {
            WorkflowState::ViewingSeatMap(selection) => selection.showtime.id,
            _ => return,
        };
        let availability = self.seats.resolve(&self.store, showtime_id).await;
        if let WorkflowState::ViewingSeatMap(selection) = &mut self.state {
            selection.availability = availability;
            selection.selected.clear();
        }
        self.present_seat_map();
    }

    fn present_seat_map(&mut self) {
        let selection = match &self.state {
            WorkflowState::ViewingSeatMap(selection) => selection,
            _ => return,
        };

        self.presenter.present(WorkflowEvent::SeatMapLoaded {
            showtime_id: selection.showtime.id,
            availability: selection.availability.clone(),
        });
        if selection.availability.seat_map().is_none() {
            self.presenter.present(WorkflowEvent::Unavailable(
                AppError::ConnectionUnavailable(String::new()).user_message(),
            ));
        }
        self.presenter.present(WorkflowEvent::PriceChanged(
            self.seats.price(&selection.selected, selection.showtime.price),
        ));
        self.presenter.present(WorkflowEvent::ConfirmEnabled(false));
    }

    fn ensure_active(&self, action: &str) -> AppResult<()> {
        if self.state.is_terminal() {
            return Err(rejected(action, &self.state));
        }
        Ok(())
    }

    fn report_unavailable(&mut self, err: AppError) -> AppError {
        warn!(movie_id = self.movie.id, error = %err, "Could not reach the booking store");
        self.presenter.present(WorkflowEvent::Unavailable(err.user_message()));
        err
    }
}

fn rejected(action: &str, state: &WorkflowState) -> AppError {
    AppError::ValidationError(format!("Cannot {} while {}", action, state.name()))
}
