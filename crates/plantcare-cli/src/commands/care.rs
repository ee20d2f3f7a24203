use chrono::NaiveDate;

use plantcare_core::calendar::{
    overdue_tasks, tasks_for_date, tasks_for_month, upcoming_tasks,
};
use plantcare_core::model::CareTask;
use plantcare_core::schedule::{complete_task, skip_task};
use plantcare_core::{Clock, PlantStore};

use crate::app::AppContext;
use crate::cli::CareCommands;
use crate::helpers::{parse_date, parse_month, parse_task_id};
use crate::output::{plant_name_map, task_line, tasks_json};

pub fn run(ctx: &AppContext, command: &CareCommands) -> anyhow::Result<()> {
    match command {
        CareCommands::Today { json } => {
            let today = ctx.clock().today();
            list_view(ctx, *json, |store, user_id| {
                tasks_for_date(store, user_id, today).map_err(Into::into)
            })
        }
        CareCommands::Upcoming { days, json } => {
            let horizon = match days {
                Some(days) => *days,
                None => ctx.upcoming_days()?,
            };
            if horizon < 0 {
                return Err(anyhow::anyhow!("--days cannot be negative"));
            }
            let clock = ctx.clock();
            list_view(ctx, *json, move |store, user_id| {
                upcoming_tasks(store, &clock, user_id, horizon).map_err(Into::into)
            })
        }
        CareCommands::Overdue { json } => {
            let clock = ctx.clock();
            list_view(ctx, *json, move |store, user_id| {
                overdue_tasks(store, &clock, user_id).map_err(Into::into)
            })
        }
        CareCommands::Month { month, json } => {
            let (year, month) = parse_month(month)?;
            list_view(ctx, *json, move |store, user_id| {
                tasks_for_month(store, user_id, year, month).map_err(Into::into)
            })
        }
        CareCommands::Date { date, json } => {
            let date: NaiveDate = parse_date(date)?;
            list_view(ctx, *json, move |store, user_id| {
                tasks_for_date(store, user_id, date).map_err(Into::into)
            })
        }
        CareCommands::Complete { task_id, notes } => complete(ctx, task_id, notes.clone()),
        CareCommands::Skip { task_id } => skip(ctx, task_id),
    }
}

fn list_view<F>(ctx: &AppContext, json: bool, query: F) -> anyhow::Result<()>
where
    F: FnOnce(&dyn PlantStore, &uuid::Uuid) -> anyhow::Result<Vec<CareTask>>,
{
    let store = ctx.open_store()?;
    let today = ctx.clock().today();
    let user = ctx.current_user(&store)?;

    let tasks = query(&store, &user.id)?;
    let names = plant_name_map(&store.list_plants(&user.id)?);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&tasks_json(&tasks, &names, today))?
        );
        return Ok(());
    }

    if tasks.is_empty() {
        if !ctx.quiet() {
            println!("No tasks.");
        }
        return Ok(());
    }
    if !ctx.quiet() {
        println!("ID | DATE | TASK | PLANT | STATE");
    }
    for task in &tasks {
        println!("{}", task_line(task, &names, today));
    }
    Ok(())
}

fn complete(ctx: &AppContext, task_id: &str, notes: Option<String>) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    let clock = ctx.clock();
    let user = ctx.current_user(&store)?;
    let task_id = parse_task_id(task_id)?;

    let task = complete_task(&mut store, &clock, &user.id, &task_id, notes)?;
    let plant = store
        .get_plant(&task.plant_id)?
        .ok_or_else(|| anyhow::anyhow!("Plant disappeared during completion"))?;

    if !ctx.quiet() {
        println!(
            "Completed {} for {} (was due {})",
            task.task_type.as_str(),
            plant.name,
            task.scheduled_date
        );
        match task.task_type {
            plantcare_core::model::TaskType::Watering => {
                println!("Next watering: {}", plant.next_watering)
            }
            plantcare_core::model::TaskType::Fertilizing => {
                println!("Next fertilizing: {}", plant.next_fertilizing)
            }
            plantcare_core::model::TaskType::Repotting => {
                if let Some(next) = plant.next_repotting {
                    println!("Next repotting: {}", next);
                }
            }
        }
        println!("Status: {}", plant.status.as_str());
    }
    Ok(())
}

fn skip(ctx: &AppContext, task_id: &str) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    let user = ctx.current_user(&store)?;
    let task_id = parse_task_id(task_id)?;

    let task = skip_task(&mut store, &user.id, &task_id)?;
    if !ctx.quiet() {
        println!(
            "Skipped {} scheduled for {}",
            task.task_type.as_str(),
            task.scheduled_date
        );
    }
    Ok(())
}
