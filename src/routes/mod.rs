pub mod admin_route;
pub mod booking_route;
pub mod movie_route;
pub mod user_route;
