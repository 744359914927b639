pub mod booking;
pub mod catalog;
pub mod seat;
pub mod showtime;
mod text_enum;

pub use text_enum::UnknownVariant;

pub use booking::{Booking, BookingSeat, BookingStatus, PaymentStatus};
pub use catalog::{Cinema, Movie, Theater};
pub use seat::{Seat, SeatMapEntry, SeatState};
pub use showtime::{Showtime, ShowtimeDetails};
