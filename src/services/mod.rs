pub mod booking_service;
pub mod schedule_service;
pub mod seat_service;
pub mod showtime_service;
pub mod store;
pub mod user_service;
