//! Reservation use cases
//!
//! Create / ChangePeriod / Confirm / Cancel / Expire. Every mutating use case
//! runs under a per-category lock, so two confirmations for the same category
//! cannot both pass the capacity check inside this process.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::ports::{ConfirmedReservation, ReservationFacade};
use crate::domain::{
    CarCategory, DomainError, RentalPeriod, RepositoryProvider, Reservation,
    ReservationConflictPolicy,
};
use crate::shared::errors::AppResult;

/// Tunables for the reservation lifecycle
#[derive(Debug, Clone)]
pub struct ReservationSettings {
    /// How long a Draft may wait for confirmation
    pub draft_ttl: Duration,
}

impl Default for ReservationSettings {
    fn default() -> Self {
        Self {
            draft_ttl: Duration::minutes(60),
        }
    }
}

/// Input of the Create use case
#[derive(Debug, Clone)]
pub struct CreateReservation {
    pub customer_id: Uuid,
    pub category: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

pub struct ReservationService {
    repos: Arc<dyn RepositoryProvider>,
    settings: ReservationSettings,
    category_locks: DashMap<CarCategory, Arc<Mutex<()>>>,
}

impl ReservationService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, settings: ReservationSettings) -> Self {
        Self {
            repos,
            settings,
            category_locks: DashMap::new(),
        }
    }

    pub fn settings(&self) -> &ReservationSettings {
        &self.settings
    }

    fn policy(&self) -> ReservationConflictPolicy<'_> {
        ReservationConflictPolicy::new(self.repos.capacity(), self.repos.overlaps())
    }

    async fn load(&self, id: Uuid) -> AppResult<Reservation> {
        self.repos
            .reservations()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", id).into())
    }

    async fn lock_category(&self, category: &CarCategory) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(&self.category_locks.entry(category.clone()).or_default());
        lock.lock_owned().await
    }

    /// Take the category lock, then load a fresh copy of the reservation.
    async fn load_locked(&self, id: Uuid) -> AppResult<(OwnedMutexGuard<()>, Reservation)> {
        let category = self.load(id).await?.category().clone();
        let guard = self.lock_category(&category).await;
        let reservation = self.load(id).await?;
        Ok((guard, reservation))
    }

    /// Create a new reservation in `Draft`
    pub async fn create(&self, cmd: CreateReservation) -> AppResult<Reservation> {
        let category = CarCategory::new(&cmd.category)?;
        let period = RentalPeriod::new(cmd.start, cmd.end)?;

        if self
            .repos
            .customers()
            .find_by_id(cmd.customer_id)
            .await?
            .is_none()
        {
            return Err(DomainError::InvalidCustomer(format!(
                "customer {} does not exist",
                cmd.customer_id
            ))
            .into());
        }

        let reservation = Reservation::create(cmd.customer_id, category, period, Utc::now());
        self.repos.reservations().add(reservation.clone()).await?;

        info!(
            reservation_id = %reservation.id(),
            customer_id = %reservation.customer_id(),
            category = %reservation.category(),
            period = %reservation.period(),
            "Reservation created"
        );
        Ok(reservation)
    }

    /// Move a Draft to a new period.
    ///
    /// The new period is checked against confirmed reservations right away,
    /// so a Draft never sits on a period that could not be confirmed.
    pub async fn change_period(
        &self,
        id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Reservation> {
        let period = RentalPeriod::new(start, end)?;
        let (_guard, mut reservation) = self.load_locked(id).await?;

        let verdict = self
            .policy()
            .check(reservation.category(), &period, Some(id))
            .await?;
        if let Err(e) = reservation.change_period(period, verdict) {
            warn!(reservation_id = %id, error = %e, "Period change rejected");
            return Err(e.into());
        }

        self.repos.reservations().update(reservation.clone()).await?;
        info!(reservation_id = %id, period = %period, "Reservation period changed");
        Ok(reservation)
    }

    pub async fn confirm(&self, id: Uuid) -> AppResult<Reservation> {
        let (_guard, mut reservation) = self.load_locked(id).await?;

        let verdict = self
            .policy()
            .check(reservation.category(), reservation.period(), Some(id))
            .await?;
        debug!(reservation_id = %id, verdict = %verdict, "Conflict check");

        if let Err(e) = reservation.confirm(verdict, Utc::now()) {
            warn!(reservation_id = %id, error = %e, "Confirmation rejected");
            return Err(e.into());
        }

        self.repos.reservations().update(reservation.clone()).await?;
        info!(
            reservation_id = %id,
            category = %reservation.category(),
            "Reservation confirmed"
        );
        Ok(reservation)
    }

    pub async fn cancel(&self, id: Uuid) -> AppResult<Reservation> {
        let (_guard, mut reservation) = self.load_locked(id).await?;

        reservation.cancel(Utc::now())?;
        self.repos.reservations().update(reservation.clone()).await?;

        info!(reservation_id = %id, "Reservation cancelled");
        Ok(reservation)
    }

    /// Expire every Draft whose deadline is at or before `now`.
    ///
    /// Returns how many reservations were expired. A failure on one
    /// reservation is logged and does not stop the batch.
    pub async fn expire_overdue(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let ttl = self.settings.draft_ttl;
        let candidates = self
            .repos
            .reservations()
            .find_expiry_candidates(
                now.checked_sub_signed(ttl).unwrap_or(DateTime::<Utc>::MIN_UTC),
                now,
            )
            .await?;

        let mut expired = 0;
        for candidate in candidates {
            let id = candidate.id();
            match self.expire_one(id, now).await {
                Ok(true) => expired += 1,
                Ok(false) => debug!(reservation_id = %id, "Reservation no longer overdue"),
                Err(e) => warn!(reservation_id = %id, error = %e, "Failed to expire reservation"),
            }
        }

        if expired > 0 {
            info!(count = expired, "Expired overdue reservations");
        }
        Ok(expired)
    }

    async fn expire_one(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let (_guard, mut reservation) = self.load_locked(id).await?;
        if !reservation.is_overdue(now, self.settings.draft_ttl) {
            return Ok(false);
        }
        reservation.expire(now, self.settings.draft_ttl)?;
        self.repos.reservations().update(reservation).await?;
        Ok(true)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Reservation> {
        self.load(id).await
    }

    pub async fn list(&self) -> AppResult<Vec<Reservation>> {
        Ok(self.repos.reservations().find_all().await?)
    }

    pub async fn list_for_customer(&self, customer_id: Uuid) -> AppResult<Vec<Reservation>> {
        Ok(self.repos.reservations().find_by_customer(customer_id).await?)
    }
}

#[async_trait]
impl ReservationFacade for ReservationService {
    async fn find_confirmed_by_id(&self, id: Uuid) -> AppResult<Option<ConfirmedReservation>> {
        let reservation = self.repos.reservations().find_by_id(id).await?;
        Ok(reservation.as_ref().and_then(ConfirmedReservation::from_reservation))
    }

    async fn mark_as_rented(&self, reservation_id: Uuid, rental_id: Uuid) -> AppResult<()> {
        let (_guard, mut reservation) = self.load_locked(reservation_id).await?;

        if reservation.rental_id() == Some(rental_id) {
            debug!(%reservation_id, %rental_id, "Reservation already linked to rental");
            return Ok(());
        }

        reservation.mark_as_rented(rental_id)?;
        self.repos.reservations().update(reservation).await?;
        info!(%reservation_id, %rental_id, "Reservation marked as rented");
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Car, Customer, ReservationConflict, ReservationStatus};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use crate::shared::errors::{AppError, ErrorKind};
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2099, 1, 1, hour, 0, 0).unwrap()
    }

    struct Fixture {
        repos: Arc<InMemoryRepositoryProvider>,
        service: ReservationService,
        customer: Uuid,
    }

    async fn fixture(cars_in_x: usize) -> Fixture {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        for i in 0..cars_in_x {
            let car = Car::new(&format!("X-{i}"), CarCategory::new("x").unwrap()).unwrap();
            repos.cars().add(car).await.unwrap();
        }
        let customer = Customer::new("Grace Hopper", "grace@example.com");
        let customer_id = customer.id;
        repos.customers().add(customer).await.unwrap();

        let service = ReservationService::new(repos.clone(), ReservationSettings::default());
        Fixture {
            repos,
            service,
            customer: customer_id,
        }
    }

    impl Fixture {
        async fn draft(&self, start: u32, end: u32) -> Reservation {
            self.service
                .create(CreateReservation {
                    customer_id: self.customer,
                    category: "X".into(),
                    start: at(start),
                    end: at(end),
                })
                .await
                .unwrap()
        }
    }

    fn kind(err: AppError) -> ErrorKind {
        err.kind()
    }

    #[tokio::test]
    async fn create_stores_draft() {
        let f = fixture(1).await;
        let r = f.draft(10, 12).await;
        assert!(r.is_draft());
        assert_eq!(r.category().as_str(), "x");
        let stored = f.service.get(r.id()).await.unwrap();
        assert_eq!(stored, r);
    }

    #[tokio::test]
    async fn create_rejects_invalid_period() {
        let f = fixture(1).await;
        let err = f
            .service
            .create(CreateReservation {
                customer_id: f.customer,
                category: "x".into(),
                start: at(12),
                end: at(12),
            })
            .await
            .unwrap_err();
        assert_eq!(kind(err), ErrorKind::InvalidPeriod);
        assert!(f.service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_requires_existing_customer() {
        let f = fixture(1).await;
        let err = f
            .service
            .create(CreateReservation {
                customer_id: Uuid::new_v4(),
                category: "x".into(),
                start: at(10),
                end: at(12),
            })
            .await
            .unwrap_err();
        assert_eq!(kind(err), ErrorKind::InvalidCustomer);
    }

    #[tokio::test]
    async fn second_overlapping_confirmation_is_over_capacity() {
        let f = fixture(1).await;
        let r1 = f.draft(10, 12).await;
        let r2 = f.draft(11, 13).await;

        let confirmed = f.service.confirm(r1.id()).await.unwrap();
        assert!(confirmed.is_confirmed());

        let err = f.service.confirm(r2.id()).await.unwrap_err();
        assert_eq!(
            err.as_domain(),
            Some(&DomainError::Conflict(ReservationConflict::OverCapacity))
        );
        assert!(f.service.get(r2.id()).await.unwrap().is_draft());
    }

    #[tokio::test]
    async fn touching_reservations_both_confirm() {
        let f = fixture(1).await;
        let r1 = f.draft(10, 12).await;
        let r2 = f.draft(12, 14).await;
        f.service.confirm(r1.id()).await.unwrap();
        f.service.confirm(r2.id()).await.unwrap();
    }

    #[tokio::test]
    async fn confirm_without_cars_is_no_category_capacity() {
        let f = fixture(0).await;
        let r = f.draft(10, 12).await;
        let err = f.service.confirm(r.id()).await.unwrap_err();
        assert_eq!(
            err.as_domain(),
            Some(&DomainError::Conflict(ReservationConflict::NoCategoryCapacity))
        );
        assert!(f.service.get(r.id()).await.unwrap().is_draft());
    }

    #[tokio::test]
    async fn confirm_unknown_reservation_is_not_found() {
        let f = fixture(1).await;
        let err = f.service.confirm(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(kind(err), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn cancelled_reservation_frees_capacity() {
        let f = fixture(1).await;
        let r1 = f.draft(10, 12).await;
        let r2 = f.draft(10, 12).await;
        f.service.confirm(r1.id()).await.unwrap();
        f.service.cancel(r1.id()).await.unwrap();
        f.service.confirm(r2.id()).await.unwrap();
    }

    #[tokio::test]
    async fn second_cancel_fails() {
        let f = fixture(1).await;
        let r = f.draft(10, 12).await;
        f.service.cancel(r.id()).await.unwrap();
        let err = f.service.cancel(r.id()).await.unwrap_err();
        assert_eq!(kind(err), ErrorKind::InvalidStatusTransition);
    }

    #[tokio::test]
    async fn change_period_rechecks_conflicts() {
        let f = fixture(1).await;
        let r1 = f.draft(10, 12).await;
        f.service.confirm(r1.id()).await.unwrap();
        let r2 = f.draft(14, 16).await;

        let err = f
            .service
            .change_period(r2.id(), at(11), at(15))
            .await
            .unwrap_err();
        assert_eq!(kind(err), ErrorKind::Conflict);
        assert_eq!(f.service.get(r2.id()).await.unwrap().period(), r2.period());

        let moved = f.service.change_period(r2.id(), at(12), at(15)).await.unwrap();
        assert_eq!(moved.period().start(), at(12));
    }

    #[tokio::test]
    async fn change_period_ignores_own_confirmation_slot() {
        let f = fixture(1).await;
        let r = f.draft(10, 12).await;
        let moved = f.service.change_period(r.id(), at(11), at(13)).await.unwrap();
        assert_eq!(moved.period().end(), at(13));
    }

    #[tokio::test]
    async fn change_period_of_confirmed_fails() {
        let f = fixture(2).await;
        let r = f.draft(10, 12).await;
        f.service.confirm(r.id()).await.unwrap();
        let err = f.service.change_period(r.id(), at(13), at(15)).await.unwrap_err();
        assert_eq!(kind(err), ErrorKind::InvalidStatusTransition);
    }

    #[tokio::test]
    async fn concurrent_confirms_do_not_overbook() {
        let f = fixture(1).await;
        let service = Arc::new(f.service);
        let mut ids = Vec::new();
        for _ in 0..5 {
            let r = service
                .create(CreateReservation {
                    customer_id: f.customer,
                    category: "x".into(),
                    start: at(10),
                    end: at(12),
                })
                .await
                .unwrap();
            ids.push(r.id());
        }

        let handles: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let service = service.clone();
                tokio::spawn(async move { service.confirm(id).await.is_ok() })
            })
            .collect();

        let mut confirmed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                confirmed += 1;
            }
        }
        assert_eq!(confirmed, 1);
    }

    #[tokio::test]
    async fn expire_overdue_only_touches_overdue_drafts() {
        let f = fixture(1).await;
        let draft = f.draft(10, 12).await;
        let confirmed = f.draft(13, 15).await;
        f.service.confirm(confirmed.id()).await.unwrap();

        assert_eq!(f.service.expire_overdue(Utc::now()).await.unwrap(), 0);

        let later = Utc::now() + Duration::hours(2);
        assert_eq!(f.service.expire_overdue(later).await.unwrap(), 1);

        let expired = f.service.get(draft.id()).await.unwrap();
        assert_eq!(expired.status(), &ReservationStatus::Expired { expired_at: later });
        assert!(f.service.get(confirmed.id()).await.unwrap().is_confirmed());

        assert_eq!(f.service.expire_overdue(later).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn expire_overdue_survives_huge_ttl() {
        let f = fixture(1).await;
        let service = ReservationService::new(
            f.repos.clone(),
            ReservationSettings {
                draft_ttl: Duration::days(365_000_000),
            },
        );
        let draft = service
            .create(CreateReservation {
                customer_id: f.customer,
                category: "x".into(),
                start: at(10),
                end: at(12),
            })
            .await
            .unwrap();

        assert_eq!(service.expire_overdue(Utc::now()).await.unwrap(), 0);
        assert_eq!(service.expire_overdue(at(10)).await.unwrap(), 1);
        assert!(matches!(
            service.get(draft.id()).await.unwrap().status(),
            ReservationStatus::Expired { .. }
        ));
    }

    #[tokio::test]
    async fn facade_only_sees_confirmed() {
        let f = fixture(1).await;
        let r = f.draft(10, 12).await;
        assert!(f.service.find_confirmed_by_id(r.id()).await.unwrap().is_none());

        f.service.confirm(r.id()).await.unwrap();
        let view = f.service.find_confirmed_by_id(r.id()).await.unwrap().unwrap();
        assert_eq!(view.id, r.id());
        assert_eq!(view.rental_id, None);
        assert!(f.service.find_confirmed_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn facade_mark_as_rented_is_idempotent() {
        let f = fixture(1).await;
        let r = f.draft(10, 12).await;
        f.service.confirm(r.id()).await.unwrap();

        let rental = Uuid::new_v4();
        f.service.mark_as_rented(r.id(), rental).await.unwrap();
        f.service.mark_as_rented(r.id(), rental).await.unwrap();
        assert_eq!(f.service.get(r.id()).await.unwrap().rental_id(), Some(rental));

        let err = f.service.mark_as_rented(r.id(), Uuid::new_v4()).await.unwrap_err();
        assert_eq!(kind(err), ErrorKind::InvalidStatusTransition);
    }
}
