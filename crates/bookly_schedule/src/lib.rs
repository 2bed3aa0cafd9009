//! Scheduling core: time grid, availability, block layout, the booking step
//! machine and the week view, plus the HTTP surface over them.

pub mod availability;
#[cfg(test)]
mod availability_proptest;
#[cfg(test)]
mod availability_test;
pub mod booking_flow;
pub mod calendar_view;
pub mod doc;
pub mod handlers;
pub mod layout;
#[cfg(test)]
mod layout_test;
pub mod routes;
pub mod store;
#[cfg(test)]
mod store_test;
#[cfg(test)]
mod test_support;
pub mod time_grid;

pub use booking_flow::{BookingError, BookingFlow, BookingStep};
pub use handlers::ScheduleState;
pub use store::InMemoryAppointmentStore;
pub use time_grid::{BusinessHours, GridError, TimeGrid};
