//! Repository provider for the domain layer
//!
//! Use cases receive one `RepositoryProvider` and ask it for the
//! repository or count source they need.

use super::car::CarRepository;
use super::customer::CustomerRepository;
use super::rental::RentalRepository;
use super::reservation::{CapacitySource, OverlapSource, ReservationRepository};

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let r = repos.reservations().find_by_id(id).await?;
///     let cars = repos.capacity().count_cars_in_category(r.category()).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn cars(&self) -> &dyn CarRepository;
    fn customers(&self) -> &dyn CustomerRepository;
    fn reservations(&self) -> &dyn ReservationRepository;
    fn rentals(&self) -> &dyn RentalRepository;

    /// Car count per category, for the conflict policy
    fn capacity(&self) -> &dyn CapacitySource;
    /// Confirmed-overlap count, for the conflict policy
    fn overlaps(&self) -> &dyn OverlapSource;
}
