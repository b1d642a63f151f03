//! Leave balance service.

use std::future::Future;

use tracing::{info, warn};
use uuid::Uuid;

use super::accrual::{annual_balance, prorated_balance};
use super::carry_over::{adjust_next_year, apply_carry_forward, guard_update};
use super::deduction::apply_deduction;
use super::error::BalanceError;
use super::types::{
    BalanceUpdate, BalanceUpdateResult, CarryOverResult, Deduction, LeaveBalance, LeavePolicy,
    NextYearAdjustment,
};
use crate::leave::LeaveType;

/// Repository trait for balance persistence.
///
/// Implemented by the db crate over a database transaction, so every write a
/// `BalanceManager` call makes commits or rolls back together.
pub trait BalanceStore: Send + Sync {
    /// Find the balance for a user and year.
    fn find(
        &self,
        user_id: Uuid,
        year: i32,
    ) -> impl Future<Output = Result<Option<LeaveBalance>, BalanceError>> + Send;

    /// Find a balance by ID.
    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<LeaveBalance>, BalanceError>> + Send;

    /// Insert a new balance.
    fn insert(
        &self,
        balance: LeaveBalance,
    ) -> impl Future<Output = Result<LeaveBalance, BalanceError>> + Send;

    /// Overwrite an existing balance.
    fn save(
        &self,
        balance: LeaveBalance,
    ) -> impl Future<Output = Result<LeaveBalance, BalanceError>> + Send;
}

/// Applies accrual, deduction and carry-over rules on top of a `BalanceStore`.
pub struct BalanceManager<S: BalanceStore> {
    store: S,
    policy: LeavePolicy,
}

impl<S: BalanceStore> BalanceManager<S> {
    /// Create a new balance manager.
    #[must_use]
    pub const fn new(store: S, policy: LeavePolicy) -> Self {
        Self { store, policy }
    }

    /// Load the balance for a user and year.
    ///
    /// # Errors
    ///
    /// Returns `BalanceError::NotFound` if no balance exists.
    pub async fn balance(&self, user_id: Uuid, year: i32) -> Result<LeaveBalance, BalanceError> {
        self.store
            .find(user_id, year)
            .await?
            .ok_or(BalanceError::NotFound { user_id, year })
    }

    /// Create a full-year balance.
    ///
    /// A positive carry-forward on the previous year's balance seeds the new
    /// record's carry-in.
    ///
    /// # Errors
    ///
    /// Returns `BalanceError::AlreadyExists` if the user already has a balance
    /// for `year`.
    pub async fn create_annual_balance(
        &self,
        user_id: Uuid,
        year: i32,
    ) -> Result<LeaveBalance, BalanceError> {
        let previous_year = shift_year(year, -1)?;
        if self.store.find(user_id, year).await?.is_some() {
            return Err(BalanceError::AlreadyExists { user_id, year });
        }

        let previous = self.store.find(user_id, previous_year).await?;
        let balance = annual_balance(user_id, year, self.policy, previous.as_ref());
        let balance = self.store.insert(balance).await?;

        info!(
            %user_id,
            year,
            carried_in = balance.carried_over_from_previous_year,
            "annual balance created"
        );
        Ok(balance)
    }

    /// Create a balance prorated to `months_worked`.
    ///
    /// Returns the existing balance unchanged when the user already has one
    /// for `year`.
    ///
    /// # Errors
    ///
    /// Returns `BalanceError::NegativeMonths` if `months_worked` is negative.
    pub async fn create_prorated_balance(
        &self,
        user_id: Uuid,
        year: i32,
        months_worked: i32,
    ) -> Result<LeaveBalance, BalanceError> {
        if months_worked < 0 {
            return Err(BalanceError::NegativeMonths(months_worked));
        }
        if let Some(existing) = self.store.find(user_id, year).await? {
            return Ok(existing);
        }

        let balance = prorated_balance(user_id, year, self.policy, months_worked)?;
        let balance = self.store.insert(balance).await?;

        info!(
            %user_id,
            year,
            months_worked,
            paid = balance.initial_paid_leave,
            sick = balance.initial_sick_leave,
            "prorated balance created"
        );
        Ok(balance)
    }

    /// Deduct `days` of `leave_type` from the user's balance for `year`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No balance exists for the user and year
    /// - `days` is negative
    /// - The relevant pool holds fewer than `days`
    pub async fn deduct(
        &self,
        user_id: Uuid,
        year: i32,
        days: i32,
        leave_type: LeaveType,
    ) -> Result<(LeaveBalance, Deduction), BalanceError> {
        let mut balance = self.balance(user_id, year).await?;
        let deduction = apply_deduction(&mut balance, days, leave_type)?;
        let balance = self.store.save(balance).await?;

        info!(%user_id, year, days, ?deduction, "leave days deducted");
        Ok((balance, deduction))
    }

    /// Carry `days` of `from_year`'s remaining paid leave into the next year.
    ///
    /// The following year's balance is created through annual accrual when
    /// it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No balance exists for `from_year`
    /// - `from_year` is the last representable year
    /// - `days` is negative or exceeds the remaining paid days
    pub async fn carry_over(
        &self,
        user_id: Uuid,
        from_year: i32,
        days: i32,
    ) -> Result<CarryOverResult, BalanceError> {
        let next_year = shift_year(from_year, 1)?;
        let mut from = self.balance(user_id, from_year).await?;
        let previously_forwarded = from.carried_over_to_next_year;
        apply_carry_forward(&mut from, days)?;
        let from = self.store.save(from).await?;

        let (next, received) = match self.store.find(user_id, next_year).await? {
            Some(next) => (next, previously_forwarded),
            None => {
                let created = annual_balance(user_id, next_year, self.policy, Some(&from));
                let created = self.store.insert(created).await?;
                let received = created.carried_over_from_previous_year;
                (created, received)
            }
        };
        let (to, adjustment) = self.adjust_next_year_balance(next, received, days).await?;

        info!(%user_id, from_year, days, "paid days carried over");
        Ok(CarryOverResult {
            from,
            to,
            discarded_days: adjustment.discarded_days,
        })
    }

    /// Write a carry-in of `carried_in` days onto `next` and persist it.
    ///
    /// `received` is the carry-in `next` was last given. Remaining paid days
    /// become `initial_paid_leave + carried_in`, so days already deducted
    /// from `next` come back. A warning is logged when that happens, and the
    /// returned adjustment counts them.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub async fn adjust_next_year_balance(
        &self,
        mut next: LeaveBalance,
        received: i32,
        carried_in: i32,
    ) -> Result<(LeaveBalance, NextYearAdjustment), BalanceError> {
        let adjustment = adjust_next_year(&mut next, received, carried_in);

        if adjustment.discarded_days > 0 {
            warn!(
                user_id = %next.user_id,
                year = next.year,
                discarded_days = adjustment.discarded_days,
                previous_remaining = adjustment.previous_remaining,
                "carry-in recomputation restored days already deducted"
            );
        }

        let next = self.store.save(next).await?;
        Ok((next, adjustment))
    }

    /// Apply a client update to a stored balance.
    ///
    /// Only `carried_over_to_next_year` is taken from `update`. When it
    /// changes, the same user's balance for the following year receives the
    /// new figure as its carry-in. A missing following year is logged and
    /// left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No balance exists with `id`
    /// - The submitted carry-forward is negative
    /// - The carry-forward changed on the last representable year
    pub async fn apply_update(
        &self,
        id: Uuid,
        update: &BalanceUpdate,
    ) -> Result<BalanceUpdateResult, BalanceError> {
        let stored = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(BalanceError::NotFoundById(id))?;

        let guarded = guard_update(&stored, update)?;
        let change = guarded
            .change
            .map(|change| shift_year(stored.year, 1).map(|following| (change, following)))
            .transpose()?;
        let balance = self.store.save(guarded.balance).await?;

        let Some((change, following)) = change else {
            return Ok(BalanceUpdateResult {
                balance,
                next_year: None,
                discarded_days: 0,
            });
        };

        info!(
            user_id = %balance.user_id,
            year = balance.year,
            previous = change.previous,
            current = change.current,
            "carry-forward changed"
        );

        let existing = self.store.find(balance.user_id, following).await?;
        let (next_year, discarded_days) = match existing {
            Some(next) => {
                let (next, adjustment) = self
                    .adjust_next_year_balance(next, change.previous, change.current)
                    .await?;
                (Some(next), adjustment.discarded_days)
            }
            None => {
                warn!(
                    user_id = %balance.user_id,
                    year = following,
                    "no balance for the following year, carry-in not propagated"
                );
                (None, 0)
            }
        };

        Ok(BalanceUpdateResult {
            balance,
            next_year,
            discarded_days,
        })
    }
}

fn shift_year(year: i32, by: i32) -> Result<i32, BalanceError> {
    year.checked_add(by).ok_or(BalanceError::YearOutOfRange(year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory balance store for testing.
    #[derive(Default)]
    struct MemoryBalanceStore {
        balances: Mutex<HashMap<Uuid, LeaveBalance>>,
    }

    impl MemoryBalanceStore {
        fn with(balances: impl IntoIterator<Item = LeaveBalance>) -> Self {
            let store = Self::default();
            {
                let mut map = store.balances.lock().unwrap();
                for balance in balances {
                    map.insert(balance.id, balance);
                }
            }
            store
        }

        fn get(&self, user_id: Uuid, year: i32) -> Option<LeaveBalance> {
            self.balances
                .lock()
                .unwrap()
                .values()
                .find(|b| b.user_id == user_id && b.year == year)
                .cloned()
        }

        fn len(&self) -> usize {
            self.balances.lock().unwrap().len()
        }
    }

    impl BalanceStore for MemoryBalanceStore {
        async fn find(&self, user_id: Uuid, year: i32) -> Result<Option<LeaveBalance>, BalanceError> {
            Ok(self.get(user_id, year))
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<LeaveBalance>, BalanceError> {
            Ok(self.balances.lock().unwrap().get(&id).cloned())
        }

        async fn insert(&self, balance: LeaveBalance) -> Result<LeaveBalance, BalanceError> {
            if self.get(balance.user_id, balance.year).is_some() {
                return Err(BalanceError::AlreadyExists {
                    user_id: balance.user_id,
                    year: balance.year,
                });
            }
            self.balances
                .lock()
                .unwrap()
                .insert(balance.id, balance.clone());
            Ok(balance)
        }

        async fn save(&self, balance: LeaveBalance) -> Result<LeaveBalance, BalanceError> {
            let mut map = self.balances.lock().unwrap();
            if !map.contains_key(&balance.id) {
                return Err(BalanceError::NotFoundById(balance.id));
            }
            map.insert(balance.id, balance.clone());
            Ok(balance)
        }
    }

    fn balance(user_id: Uuid, year: i32) -> LeaveBalance {
        LeaveBalance {
            id: Uuid::new_v4(),
            user_id,
            year,
            initial_paid_leave: 22,
            initial_sick_leave: 15,
            remaining_paid_leave: 22,
            remaining_sick_leave: 15,
            carried_over_from_previous_year: 0,
            carried_over_to_next_year: 0,
        }
    }

    fn manager(store: MemoryBalanceStore) -> BalanceManager<MemoryBalanceStore> {
        BalanceManager::new(store, LeavePolicy::default())
    }

    #[tokio::test]
    async fn test_create_annual_balance() {
        let user_id = Uuid::new_v4();
        let manager = manager(MemoryBalanceStore::default());

        let created = manager.create_annual_balance(user_id, 2024).await.unwrap();

        assert_eq!(created.initial_paid_leave, 22);
        assert_eq!(created.remaining_sick_leave, 15);
        assert_eq!(manager.store.get(user_id, 2024), Some(created));
    }

    #[tokio::test]
    async fn test_create_annual_balance_seeds_carry_in() {
        let user_id = Uuid::new_v4();
        let mut previous = balance(user_id, 2023);
        previous.carried_over_to_next_year = 3;
        let manager = manager(MemoryBalanceStore::with([previous]));

        let created = manager.create_annual_balance(user_id, 2024).await.unwrap();

        assert_eq!(created.carried_over_from_previous_year, 3);
        assert_eq!(created.remaining_paid_leave, 22);
    }

    #[tokio::test]
    async fn test_create_annual_balance_twice_fails() {
        let user_id = Uuid::new_v4();
        let manager = manager(MemoryBalanceStore::default());

        manager.create_annual_balance(user_id, 2024).await.unwrap();
        let err = manager
            .create_annual_balance(user_id, 2024)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            BalanceError::AlreadyExists {
                user_id,
                year: 2024
            }
        );
        assert_eq!(manager.store.len(), 1);
    }

    #[tokio::test]
    async fn test_create_prorated_balance_is_idempotent() {
        let user_id = Uuid::new_v4();
        let manager = manager(MemoryBalanceStore::default());

        let first = manager
            .create_prorated_balance(user_id, 2024, 6)
            .await
            .unwrap();
        let second = manager
            .create_prorated_balance(user_id, 2024, 3)
            .await
            .unwrap();

        assert_eq!(first.initial_paid_leave, 11);
        assert_eq!(first.initial_sick_leave, 8);
        assert_eq!(second, first);
        assert_eq!(manager.store.len(), 1);
    }

    #[tokio::test]
    async fn test_create_prorated_balance_rejects_negative_months() {
        let manager = manager(MemoryBalanceStore::default());
        let err = manager
            .create_prorated_balance(Uuid::new_v4(), 2024, -3)
            .await
            .unwrap_err();

        assert_eq!(err, BalanceError::NegativeMonths(-3));
        assert_eq!(manager.store.len(), 0);
    }

    #[tokio::test]
    async fn test_deduct_consumes_carry_over_first() {
        let user_id = Uuid::new_v4();
        let mut stored = balance(user_id, 2024);
        stored.remaining_paid_leave = 10;
        stored.carried_over_from_previous_year = 3;
        let manager = manager(MemoryBalanceStore::with([stored]));

        let (updated, deduction) = manager
            .deduct(user_id, 2024, 5, LeaveType::Paid)
            .await
            .unwrap();

        assert_eq!(updated.remaining_paid_leave, 8);
        assert_eq!(updated.carried_over_from_previous_year, 0);
        assert_eq!(deduction.total(), 5);
        assert_eq!(manager.store.get(user_id, 2024), Some(updated));
    }

    #[tokio::test]
    async fn test_deduct_without_balance() {
        let user_id = Uuid::new_v4();
        let manager = manager(MemoryBalanceStore::default());

        let err = manager
            .deduct(user_id, 2024, 1, LeaveType::Sick)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            BalanceError::NotFound {
                user_id,
                year: 2024
            }
        );
    }

    #[tokio::test]
    async fn test_failed_deduct_persists_nothing() {
        let user_id = Uuid::new_v4();
        let stored = balance(user_id, 2024);
        let manager = manager(MemoryBalanceStore::with([stored.clone()]));

        let result = manager.deduct(user_id, 2024, 16, LeaveType::Sick).await;

        assert!(matches!(
            result,
            Err(BalanceError::InsufficientSickBalance { .. })
        ));
        assert_eq!(manager.store.get(user_id, 2024), Some(stored));
    }

    #[tokio::test]
    async fn test_carry_over_creates_next_year() {
        let user_id = Uuid::new_v4();
        let manager = manager(MemoryBalanceStore::with([balance(user_id, 2024)]));

        let result = manager.carry_over(user_id, 2024, 5).await.unwrap();

        assert_eq!(result.from.remaining_paid_leave, 17);
        assert_eq!(result.from.carried_over_to_next_year, 5);
        assert_eq!(result.to.year, 2025);
        assert_eq!(result.to.carried_over_from_previous_year, 5);
        assert_eq!(result.to.remaining_paid_leave, 27);
        assert_eq!(manager.store.get(user_id, 2025), Some(result.to));
    }

    #[tokio::test]
    async fn test_carry_over_updates_existing_next_year() {
        let user_id = Uuid::new_v4();
        let next = balance(user_id, 2025);
        let next_id = next.id;
        let manager = manager(MemoryBalanceStore::with([balance(user_id, 2024), next]));

        let result = manager.carry_over(user_id, 2024, 4).await.unwrap();

        assert_eq!(result.to.id, next_id);
        assert_eq!(result.to.carried_over_from_previous_year, 4);
        assert_eq!(result.to.remaining_paid_leave, 26);
        assert_eq!(manager.store.len(), 2);
    }

    #[tokio::test]
    async fn test_carry_over_exceeding_remaining_changes_nothing() {
        let user_id = Uuid::new_v4();
        let mut stored = balance(user_id, 2024);
        stored.remaining_paid_leave = 4;
        let manager = manager(MemoryBalanceStore::with([stored.clone()]));

        let err = manager.carry_over(user_id, 2024, 5).await.unwrap_err();

        assert_eq!(
            err,
            BalanceError::CarryOverExceedsRemaining {
                requested: 5,
                remaining: 4
            }
        );
        assert_eq!(manager.store.get(user_id, 2024), Some(stored));
        assert_eq!(manager.store.get(user_id, 2025), None);
    }

    #[tokio::test]
    async fn test_apply_update_propagates_carry_forward() {
        let user_id = Uuid::new_v4();
        let current = balance(user_id, 2024);
        let id = current.id;
        let manager = manager(MemoryBalanceStore::with([current, balance(user_id, 2025)]));

        let update = BalanceUpdate {
            remaining_paid_leave: Some(99),
            carried_over_to_next_year: Some(6),
            ..BalanceUpdate::default()
        };
        let result = manager.apply_update(id, &update).await.unwrap();

        assert_eq!(result.balance.remaining_paid_leave, 22);
        assert_eq!(result.balance.carried_over_to_next_year, 6);
        let next = result.next_year.unwrap();
        assert_eq!(next.carried_over_from_previous_year, 6);
        assert_eq!(next.remaining_paid_leave, 28);
    }

    #[tokio::test]
    async fn test_apply_update_discards_next_year_deductions() {
        let user_id = Uuid::new_v4();
        let current = balance(user_id, 2024);
        let id = current.id;
        let mut next = balance(user_id, 2025);
        next.remaining_paid_leave = 18;
        let manager = manager(MemoryBalanceStore::with([current, next]));

        let update = BalanceUpdate {
            carried_over_to_next_year: Some(2),
            ..BalanceUpdate::default()
        };
        let result = manager.apply_update(id, &update).await.unwrap();

        assert_eq!(result.next_year.unwrap().remaining_paid_leave, 24);
    }

    #[tokio::test]
    async fn test_apply_update_reports_days_used_after_earlier_carry_in() {
        let user_id = Uuid::new_v4();
        let manager = manager(MemoryBalanceStore::with([balance(user_id, 2024)]));

        let carried = manager.carry_over(user_id, 2024, 5).await.unwrap();
        assert_eq!(carried.discarded_days, 0);
        manager
            .deduct(user_id, 2025, 8, LeaveType::Paid)
            .await
            .unwrap();

        let update = BalanceUpdate {
            carried_over_to_next_year: Some(4),
            ..BalanceUpdate::default()
        };
        let result = manager.apply_update(carried.from.id, &update).await.unwrap();

        assert_eq!(result.discarded_days, 8);
        let next = result.next_year.unwrap();
        assert_eq!(next.carried_over_from_previous_year, 4);
        assert_eq!(next.remaining_paid_leave, 26);
    }

    #[tokio::test]
    async fn test_carry_over_again_reports_used_days() {
        let user_id = Uuid::new_v4();
        let manager = manager(MemoryBalanceStore::with([balance(user_id, 2024)]));

        manager.carry_over(user_id, 2024, 5).await.unwrap();
        manager
            .deduct(user_id, 2025, 2, LeaveType::Paid)
            .await
            .unwrap();
        let again = manager.carry_over(user_id, 2024, 3).await.unwrap();

        assert_eq!(again.discarded_days, 2);
        assert_eq!(again.to.carried_over_from_previous_year, 3);
    }

    #[tokio::test]
    async fn test_year_overflow_is_rejected() {
        let user_id = Uuid::new_v4();
        let last = balance(user_id, i32::MAX);
        let last_id = last.id;
        let manager = manager(MemoryBalanceStore::with([last.clone()]));

        let err = manager.carry_over(user_id, i32::MAX, 1).await.unwrap_err();
        assert_eq!(err, BalanceError::YearOutOfRange(i32::MAX));

        let update = BalanceUpdate {
            carried_over_to_next_year: Some(1),
            ..BalanceUpdate::default()
        };
        let err = manager.apply_update(last_id, &update).await.unwrap_err();
        assert_eq!(err, BalanceError::YearOutOfRange(i32::MAX));
        assert_eq!(manager.store.get(user_id, i32::MAX), Some(last));

        let err = manager
            .create_annual_balance(user_id, i32::MIN)
            .await
            .unwrap_err();
        assert_eq!(err, BalanceError::YearOutOfRange(i32::MIN));
        assert_eq!(manager.store.len(), 1);
    }

    #[tokio::test]
    async fn test_apply_update_without_next_year_creates_nothing() {
        let user_id = Uuid::new_v4();
        let current = balance(user_id, 2024);
        let id = current.id;
        let manager = manager(MemoryBalanceStore::with([current]));

        let update = BalanceUpdate {
            carried_over_to_next_year: Some(5),
            ..BalanceUpdate::default()
        };
        let result = manager.apply_update(id, &update).await.unwrap();

        assert_eq!(result.balance.carried_over_to_next_year, 5);
        assert_eq!(result.balance.remaining_paid_leave, 22);
        assert!(result.next_year.is_none());
        assert_eq!(manager.store.len(), 1);
    }

    #[tokio::test]
    async fn test_apply_update_unchanged_skips_propagation() {
        let user_id = Uuid::new_v4();
        let current = balance(user_id, 2024);
        let id = current.id;
        let mut next = balance(user_id, 2025);
        next.remaining_paid_leave = 10;
        let manager = manager(MemoryBalanceStore::with([current, next.clone()]));

        let result = manager
            .apply_update(id, &BalanceUpdate::default())
            .await
            .unwrap();

        assert!(result.next_year.is_none());
        assert_eq!(manager.store.get(user_id, 2025), Some(next));
    }

    #[tokio::test]
    async fn test_apply_update_unknown_id() {
        let manager = manager(MemoryBalanceStore::default());
        let id = Uuid::new_v4();

        let err = manager
            .apply_update(id, &BalanceUpdate::default())
            .await
            .unwrap_err();

        assert_eq!(err, BalanceError::NotFoundById(id));
    }
}
