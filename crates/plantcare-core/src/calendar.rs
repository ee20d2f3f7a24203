//! Care Calendar queries.
//!
//! Read-side composition over the task store: by date, by calendar month,
//! rolling upcoming window, and overdue. No mutation happens here.

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{CareError, Result};
use crate::model::CareTask;
use crate::storage::{PlantStore, TaskFilter};

/// Default horizon for [`upcoming_tasks`].
pub const DEFAULT_UPCOMING_DAYS: i64 = 7;

/// All of a user's tasks scheduled on a specific date.
pub fn tasks_for_date(
    store: &dyn PlantStore,
    user_id: &Uuid,
    date: NaiveDate,
) -> Result<Vec<CareTask>> {
    store.list_tasks(&TaskFilter::new().user(*user_id).on(date))
}

/// All of a user's tasks in a calendar month, first through last day
/// inclusive.
pub fn tasks_for_month(
    store: &dyn PlantStore,
    user_id: &Uuid,
    year: i32,
    month: u32,
) -> Result<Vec<CareTask>> {
    if !(1..=12).contains(&month) {
        return Err(CareError::Validation(
            "Month must be between 1 and 12".to_string(),
        ));
    }
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| CareError::Validation(format!("Invalid month: {}-{}", year, month)))?;
    let end = last_day_of_month(year, month)?;

    store.list_tasks(&TaskFilter::new().user(*user_id).since(start).until(end))
}

/// A user's incomplete tasks in `[today, today + horizon_days]`.
pub fn upcoming_tasks(
    store: &dyn PlantStore,
    clock: &dyn Clock,
    user_id: &Uuid,
    horizon_days: i64,
) -> Result<Vec<CareTask>> {
    let today = clock.today();
    let end = today + Duration::days(horizon_days);
    store.list_tasks(
        &TaskFilter::new()
            .user(*user_id)
            .since(today)
            .until(end)
            .incomplete(),
    )
}

/// A user's incomplete tasks scheduled before today.
pub fn overdue_tasks(
    store: &dyn PlantStore,
    clock: &dyn Clock,
    user_id: &Uuid,
) -> Result<Vec<CareTask>> {
    let yesterday = clock.today() - Duration::days(1);
    store.list_tasks(&TaskFilter::new().user(*user_id).until(yesterday).incomplete())
}

/// Last calendar day of a month via standard month-length rules.
fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .map(|d| d - Duration::days(1))
        .ok_or_else(|| CareError::Validation(format!("Invalid month: {}-{}", year, month)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2024, 2).unwrap(), date(2024, 2, 29));
        assert_eq!(last_day_of_month(2023, 2).unwrap(), date(2023, 2, 28));
        assert_eq!(last_day_of_month(2024, 12).unwrap(), date(2024, 12, 31));
        assert_eq!(last_day_of_month(2024, 4).unwrap(), date(2024, 4, 30));
    }

    #[test]
    fn test_month_out_of_range_rejected() {
        // Validation happens before any store access.
        let store = crate::storage::SqliteStore::open_in_memory().unwrap();
        let user = Uuid::new_v4();
        assert!(tasks_for_month(&store, &user, 2024, 0).is_err());
        assert!(tasks_for_month(&store, &user, 2024, 13).is_err());
    }
}
