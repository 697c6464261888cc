use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::*;
use crate::models::booking::{BookingReceipt, ClearedBookings, NewBooking};
use crate::models::user::Role;

#[derive(Default)]
struct MemoryStore {
    showtimes: Vec<Showtime>,
    booked: Mutex<Vec<(i64, SeatLabel)>>,
    bookings_created: AtomicUsize,
    store_calls: AtomicUsize,
    offline: AtomicBool,
}

impl MemoryStore {
    fn with_showtimes(showtimes: Vec<Showtime>) -> Arc<Self> {
        Arc::new(MemoryStore {
            showtimes,
            ..Default::default()
        })
    }

    fn take_seat(&self, showtime_id: i64, seat: &str) {
        self.booked
            .lock()
            .unwrap()
            .push((showtime_id, seat.parse().unwrap()));
    }

    fn calls(&self) -> usize {
        self.store_calls.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> AppResult<()> {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::ConnectionUnavailable("store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn list_dates(&self, movie_id: i64) -> AppResult<Vec<NaiveDate>> {
        self.check_online()?;
        let dates: BTreeSet<NaiveDate> = self
            .showtimes
            .iter()
            .filter(|s| s.movie_id == movie_id)
            .map(|s| s.date())
            .collect();
        Ok(dates.into_iter().collect())
    }

    async fn list_showtimes(&self, movie_id: i64, date: NaiveDate) -> AppResult<Vec<Showtime>> {
        self.check_online()?;
        let mut showtimes: Vec<Showtime> = self
            .showtimes
            .iter()
            .filter(|s| s.movie_id == movie_id && s.date() == date)
            .cloned()
            .collect();
        showtimes.sort_by_key(|s| s.start_time);
        Ok(showtimes)
    }

    async fn list_taken_seats(&self, showtime_id: i64) -> AppResult<Vec<SeatLabel>> {
        self.check_online()?;
        let booked = self.booked.lock().unwrap();
        Ok(booked
            .iter()
            .filter(|(id, _)| *id == showtime_id)
            .map(|(_, seat)| *seat)
            .collect())
    }

    async fn create_booking(&self, booking: NewBooking) -> AppResult<BookingReceipt> {
        self.check_online()?;
        let mut booked = self.booked.lock().unwrap();
        if let Some(seat) = booking
            .seats
            .iter()
            .find(|seat| booked.contains(&(booking.showtime_id, **seat)))
        {
            return Err(AppError::SeatConflict(format!("Seat {} is taken", seat)));
        }
        booked.extend(booking.seats.iter().map(|seat| (booking.showtime_id, *seat)));
        let booking_id = self.bookings_created.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        Ok(BookingReceipt {
            booking_id,
            reference: Uuid::new_v4(),
        })
    }

    async fn delete_all_bookings(&self, _session: &Session) -> AppResult<ClearedBookings> {
        self.check_online()?;
        let mut booked = self.booked.lock().unwrap();
        let seats_released = booked.len() as u64;
        booked.clear();
        Ok(ClearedBookings {
            bookings_deleted: self.bookings_created.swap(0, Ordering::SeqCst) as u64,
            seats_released,
        })
    }
}

fn at(date: &str, time: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M").unwrap()
}

fn showtime(id: i64, start: NaiveDateTime) -> Showtime {
    Showtime {
        id,
        movie_id: 1,
        room_id: 3,
        start_time: start,
        price: Decimal::new(1500, 2),
    }
}

fn movie() -> Movie {
    Movie {
        id: 1,
        title: "Metropolis".to_string(),
        genre: "Sci-Fi".to_string(),
        duration_minutes: 153,
        description: "A city of the future.".to_string(),
        poster_link: None,
    }
}

fn seat(label: &str) -> SeatLabel {
    label.parse().unwrap()
}

fn store() -> Arc<MemoryStore> {
    MemoryStore::with_showtimes(vec![
        showtime(11, at("2026-02-20", "21:00")),
        showtime(10, at("2026-01-14", "18:00")),
        showtime(12, at("2026-02-20", "14:30")),
    ])
}

fn member() -> Session {
    Session::authenticated(7, "ada", Role::Member)
}

fn workflow(
    store: &Arc<MemoryStore>,
    session: Session,
) -> BookingWorkflow<Arc<MemoryStore>, RecordingPresenter> {
    BookingWorkflow::new(
        Arc::clone(store),
        RecordingPresenter::new(),
        session,
        movie(),
        SeatingPlan::default(),
    )
}

async fn at_seat_map(
    store: &Arc<MemoryStore>,
    session: Session,
) -> BookingWorkflow<Arc<MemoryStore>, RecordingPresenter> {
    let mut flow = workflow(store, session);
    flow.load_dates().await.unwrap();
    flow.select_date(NaiveDate::from_ymd_opt(2026, 1, 14).unwrap())
        .await
        .unwrap();
    flow.select_time(10).await.unwrap();
    flow.presenter_mut().take();
    flow
}

#[tokio::test]
async fn dates_come_back_distinct_and_ascending() {
    let store = store();
    let mut flow = workflow(&store, member());

    let dates = flow.load_dates().await.unwrap().to_vec();

    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2026, 1, 14).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
        ]
    );
    assert_eq!(flow.presenter().events(), &[WorkflowEvent::DatesLoaded(dates)]);
}

#[tokio::test]
async fn showtimes_for_a_date_are_ordered_by_start() {
    let store = store();
    let mut flow = workflow(&store, member());

    let ids: Vec<i64> = flow
        .select_date(NaiveDate::from_ymd_opt(2026, 2, 20).unwrap())
        .await
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();

    assert_eq!(ids, vec![12, 11]);
    assert!(matches!(flow.state(), WorkflowState::SelectingTime { .. }));
}

#[tokio::test]
async fn picking_a_time_from_another_day_is_rejected() {
    let store = store();
    let mut flow = workflow(&store, member());
    flow.select_date(NaiveDate::from_ymd_opt(2026, 1, 14).unwrap())
        .await
        .unwrap();

    let err = flow.select_time(11).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert!(matches!(flow.state(), WorkflowState::SelectingTime { .. }));
}

#[tokio::test]
async fn seat_map_shows_booked_seats_as_taken() {
    let store = store();
    store.take_seat(10, "C4");
    store.take_seat(11, "A1");

    let flow = at_seat_map(&store, member()).await;

    match flow.state() {
        WorkflowState::ViewingSeatMap(selection) => {
            let map = selection.availability.seat_map().unwrap();
            assert_eq!(map.taken(), vec![seat("C4")]);
            assert_eq!(map.available_count(), 79);
        }
        other => panic!("unexpected state {other:?}"),
    }
}

#[tokio::test]
async fn toggling_twice_restores_selection_and_price() {
    let store = store();
    let mut flow = at_seat_map(&store, member()).await;

    flow.toggle_seat(seat("B3")).unwrap();
    let before = flow.selected().cloned().unwrap();
    let price_before = flow.total().unwrap();

    flow.toggle_seat(seat("G5")).unwrap();
    assert_eq!(flow.total().unwrap(), Decimal::new(3500, 2));
    flow.toggle_seat(seat("G5")).unwrap();

    assert_eq!(flow.selected().cloned().unwrap(), before);
    assert_eq!(flow.total().unwrap(), price_before);
    assert_eq!(price_before, Decimal::new(1500, 2));
}

#[tokio::test]
async fn toggle_emits_price_and_confirm_state() {
    let store = store();
    let mut flow = at_seat_map(&store, member()).await;

    flow.toggle_seat(seat("H1")).unwrap();
    flow.toggle_seat(seat("H1")).unwrap();

    assert_eq!(
        flow.presenter().events(),
        &[
            WorkflowEvent::PriceChanged(Decimal::new(2000, 2)),
            WorkflowEvent::ConfirmEnabled(true),
            WorkflowEvent::PriceChanged(Decimal::ZERO),
            WorkflowEvent::ConfirmEnabled(false),
        ]
    );
}

#[tokio::test]
async fn taken_and_off_grid_seats_cannot_be_selected() {
    let store = store();
    store.take_seat(10, "D5");
    let mut flow = at_seat_map(&store, member()).await;

    assert!(matches!(
        flow.toggle_seat(seat("D5")),
        Err(AppError::ValidationError(_))
    ));
    assert!(matches!(
        flow.toggle_seat(seat("K1")),
        Err(AppError::ValidationError(_))
    ));
    assert!(flow.selected().unwrap().is_empty());
}

#[tokio::test]
async fn toggling_before_a_time_is_chosen_is_rejected() {
    let store = store();
    let mut flow = workflow(&store, member());
    assert!(matches!(
        flow.toggle_seat(seat("A1")),
        Err(AppError::ValidationError(_))
    ));
}

#[tokio::test]
async fn empty_confirm_never_reaches_the_store() {
    let store = store();
    let mut flow = at_seat_map(&store, member()).await;
    let calls = store.calls();

    let err = flow.confirm().await.unwrap_err();

    assert!(matches!(err, AppError::ValidationError(_)));
    assert_eq!(store.calls(), calls);
    assert!(!flow.confirm_enabled());
    assert!(matches!(flow.state(), WorkflowState::ViewingSeatMap(_)));
}

#[tokio::test]
async fn member_confirm_issues_a_ticket() {
    let store = store();
    let mut flow = at_seat_map(&store, member()).await;
    flow.toggle_seat(seat("G5")).unwrap();
    flow.toggle_seat(seat("B3")).unwrap();

    let outcome = flow.confirm().await.unwrap();

    let ticket = match outcome {
        ConfirmOutcome::Ticketed(ticket) => ticket,
        other => panic!("unexpected outcome {other:?}"),
    };
    assert_eq!(ticket.movie_title, "Metropolis");
    assert_eq!(ticket.seats, vec!["B3", "G5"]);
    assert_eq!(ticket.total, Decimal::new(3500, 2));
    assert_eq!(ticket.date, NaiveDate::from_ymd_opt(2026, 1, 14).unwrap());
    assert_eq!(ticket.room_id, 3);
    assert!(ticket.qr_payload().starts_with("CINEMA-TICKET:"));
    assert_eq!(flow.state(), &WorkflowState::Ticketed(ticket.clone()));
    assert_eq!(
        flow.presenter().last(),
        Some(&WorkflowEvent::BookingSucceeded(ticket))
    );

    // Ticketed is terminal
    assert!(matches!(
        flow.toggle_seat(seat("A1")),
        Err(AppError::ValidationError(_))
    ));
}

#[tokio::test]
async fn guest_confirm_asks_for_login_without_booking() {
    let store = store();
    let mut flow = at_seat_map(&store, Session::guest()).await;
    flow.toggle_seat(seat("A1")).unwrap();
    let calls = store.calls();

    let outcome = flow.confirm().await.unwrap();

    assert_eq!(outcome, ConfirmOutcome::LoginRequired);
    assert_eq!(store.calls(), calls);
    assert_eq!(flow.state(), &WorkflowState::LoginRequired);
    assert_eq!(flow.presenter().last(), Some(&WorkflowEvent::LoginRequired));
    assert!(flow.load_dates().await.is_err());
}

#[tokio::test]
async fn conflict_reloads_the_map_and_clears_selection() {
    let store = store();
    let mut flow = at_seat_map(&store, member()).await;
    flow.toggle_seat(seat("E5")).unwrap();
    flow.toggle_seat(seat("E6")).unwrap();

    // Someone else gets E6 first
    store.take_seat(10, "E6");

    let err = flow.confirm().await.unwrap_err();
    assert!(matches!(err, AppError::SeatConflict(_)));

    match flow.state() {
        WorkflowState::ViewingSeatMap(selection) => {
            assert!(selection.selected.is_empty());
            let map = selection.availability.seat_map().unwrap();
            assert!(!map.is_available(&seat("E6")));
            assert!(map.is_available(&seat("E5")));
        }
        other => panic!("unexpected state {other:?}"),
    }

    let events = flow.presenter().events();
    assert!(events
        .iter()
        .any(|e| matches!(e, WorkflowEvent::BookingFailed(reason) if reason.contains("E6"))));
    assert_eq!(events.last(), Some(&WorkflowEvent::ConfirmEnabled(false)));
    assert_eq!(store.booked.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_availability_blocks_seats_and_confirm() {
    let store = store();
    let mut flow = workflow(&store, member());
    flow.select_date(NaiveDate::from_ymd_opt(2026, 1, 14).unwrap())
        .await
        .unwrap();

    store.offline.store(true, Ordering::SeqCst);
    flow.select_time(10).await.unwrap();

    match flow.state() {
        WorkflowState::ViewingSeatMap(selection) => {
            assert_eq!(selection.availability, Availability::Unknown)
        }
        other => panic!("unexpected state {other:?}"),
    }
    assert!(flow
        .presenter()
        .events()
        .iter()
        .any(|e| matches!(e, WorkflowEvent::Unavailable(_))));
    assert!(matches!(
        flow.toggle_seat(seat("A1")),
        Err(AppError::ConnectionUnavailable(_))
    ));
    assert!(!flow.confirm_enabled());
}

#[tokio::test]
async fn store_outage_while_loading_dates_is_reported() {
    let store = store();
    store.offline.store(true, Ordering::SeqCst);
    let mut flow = workflow(&store, member());

    let err = flow.load_dates().await.unwrap_err();

    assert!(matches!(err, AppError::ConnectionUnavailable(_)));
    assert!(matches!(
        flow.presenter().last(),
        Some(WorkflowEvent::Unavailable(_))
    ));
}

#[tokio::test]
async fn channel_presenter_forwards_events() {
    let store = store();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut flow = BookingWorkflow::new(
        Arc::clone(&store),
        tx,
        member(),
        movie(),
        SeatingPlan::default(),
    );

    flow.load_dates().await.unwrap();

    assert!(matches!(rx.recv().await, Some(WorkflowEvent::DatesLoaded(dates)) if dates.len() == 2));
}
