//! Parsing and lookup helpers shared by the command handlers.

use chrono::NaiveDate;
use uuid::Uuid;

use plantcare_core::model::{PlantType, UserPlant};
use plantcare_core::PlantStore;

pub fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("Invalid date {} (expected YYYY-MM-DD): {}", value, e))
}

/// Parse "YYYY-MM" into a (year, month) pair.
pub fn parse_month(value: &str) -> anyhow::Result<(i32, u32)> {
    let (year, month) = value
        .split_once('-')
        .ok_or_else(|| anyhow::anyhow!("Invalid month {} (expected YYYY-MM)", value))?;
    let year: i32 = year
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid year in {}", value))?;
    let month: u32 = month
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid month in {}", value))?;
    Ok((year, month))
}

pub fn parse_task_id(value: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| anyhow::anyhow!("Invalid task ID: {}", e))
}

/// Look up one of the user's plants by UUID or display name. Name matches
/// are case-insensitive and must be unique.
pub fn resolve_plant(
    store: &dyn PlantStore,
    user_id: &Uuid,
    selector: &str,
) -> anyhow::Result<UserPlant> {
    if let Ok(id) = Uuid::parse_str(selector) {
        let plant = store.get_plant(&id)?;
        if let Some(plant) = plant {
            if plant.user_id == *user_id {
                return Ok(plant);
            }
        }
        return Err(anyhow::anyhow!("Plant {} not found", selector));
    }

    let mut matches: Vec<UserPlant> = store
        .list_plants(user_id)?
        .into_iter()
        .filter(|p| p.name.eq_ignore_ascii_case(selector))
        .collect();
    match matches.len() {
        0 => Err(anyhow::anyhow!("Plant \"{}\" not found", selector)),
        1 => Ok(matches.remove(0)),
        n => Err(anyhow::anyhow!(
            "{} plants named \"{}\"; use the UUID instead",
            n,
            selector
        )),
    }
}

/// Look up a catalog entry by UUID or name (case-insensitive, unique).
pub fn resolve_plant_type(store: &dyn PlantStore, selector: &str) -> anyhow::Result<PlantType> {
    if let Ok(id) = Uuid::parse_str(selector) {
        return store
            .get_plant_type(&id)?
            .ok_or_else(|| anyhow::anyhow!("Plant type {} not found", selector));
    }

    let mut matches: Vec<PlantType> = store
        .list_plant_types()?
        .into_iter()
        .filter(|t| t.name.eq_ignore_ascii_case(selector))
        .collect();
    match matches.len() {
        0 => Err(anyhow::anyhow!("Plant type \"{}\" not found", selector)),
        1 => Ok(matches.remove(0)),
        n => Err(anyhow::anyhow!(
            "{} plant types named \"{}\"; use the UUID instead",
            n,
            selector
        )),
    }
}

/// Read a pair flag like `--temp MIN MAX` out of clap's Vec form.
pub fn range_pair<T: Copy>(values: &[T], flag: &str) -> anyhow::Result<(T, T)> {
    match values {
        [min, max] => Ok((*min, *max)),
        _ => Err(anyhow::anyhow!("--{} requires exactly two values", flag)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-06").unwrap(), (2024, 6));
        assert_eq!(parse_month("1999-12").unwrap(), (1999, 12));
        assert!(parse_month("2024").is_err());
        assert!(parse_month("2024-xx").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_date("02/29/2024").is_err());
    }
}
