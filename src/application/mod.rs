//! Application layer: use cases orchestrating the domain aggregates.

pub mod ports;
pub mod services;

pub use ports::{ConfirmedReservation, ReservationFacade};
pub use services::{
    start_reservation_expiry_task, CreateReservation, FleetService, PickupRental, RegisterCar,
    RegisterCustomer, RentalService, ReservationService, ReservationSettings, ReturnRental,
};
