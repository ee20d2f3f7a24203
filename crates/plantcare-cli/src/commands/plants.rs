use std::collections::HashMap;

use plantcare_core::model::{days_until, NewPlant};
use plantcare_core::plants::{
    create_plant, delete_plant, refresh_status, update_plant_details,
};
use plantcare_core::{Clock, PlantStore};

use crate::app::AppContext;
use crate::cli::{PlantAddArgs, PlantCommands};
use crate::helpers::{parse_date, resolve_plant, resolve_plant_type};
use crate::output::plant_json;

pub fn run(ctx: &AppContext, command: &PlantCommands) -> anyhow::Result<()> {
    match command {
        PlantCommands::Add(args) => add(ctx, args),
        PlantCommands::List { json } => list(ctx, *json),
        PlantCommands::Show { plant, json } => show(ctx, plant, *json),
        PlantCommands::Update {
            plant,
            name,
            location,
            notes,
        } => update(ctx, plant, name.clone(), location.clone(), notes.clone()),
        PlantCommands::Remove { plant } => remove(ctx, plant),
        PlantCommands::Refresh { plant } => refresh(ctx, plant),
    }
}

fn add(ctx: &AppContext, args: &PlantAddArgs) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    let clock = ctx.clock();
    let user = ctx.current_user(&store)?;
    let plant_type = resolve_plant_type(&store, &args.plant_type)?;

    let today = clock.today();
    let last_watered = match &args.last_watered {
        Some(value) => parse_date(value)?,
        None => today,
    };
    let last_fertilized = match &args.last_fertilized {
        Some(value) => parse_date(value)?,
        None => today,
    };
    let last_repotted = args.last_repotted.as_deref().map(parse_date).transpose()?;

    let plant = create_plant(
        &mut store,
        &clock,
        &NewPlant {
            user_id: user.id,
            plant_type_id: plant_type.id,
            name: args.name.clone(),
            location: args.location.clone(),
            last_watered,
            last_fertilized,
            last_repotted,
            notes: args.notes.clone(),
        },
    )?;

    if !ctx.quiet() {
        println!("Added plant {} ({})", plant.name, plant.id);
        println!("Next watering: {}", plant.next_watering);
        println!("Next fertilizing: {}", plant.next_fertilizing);
        if let Some(repotting) = plant.next_repotting {
            println!("Next repotting: {}", repotting);
        }
    }
    Ok(())
}

fn type_name_map(store: &dyn PlantStore) -> anyhow::Result<HashMap<uuid::Uuid, String>> {
    Ok(store
        .list_plant_types()?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect())
}

fn list(ctx: &AppContext, json: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let today = ctx.clock().today();
    let user = ctx.current_user(&store)?;
    let plants = store.list_plants(&user.id)?;

    if json {
        let names = type_name_map(&store)?;
        let values: Vec<serde_json::Value> = plants
            .iter()
            .map(|p| plant_json(p, &names, today))
            .collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    if !ctx.quiet() {
        println!("ID | NAME | STATUS | NEXT WATERING | SENSOR");
    }
    for plant in plants {
        let sensor = if plant.has_sensor { "yes" } else { "no" };
        println!(
            "{} | {} | {} | {} ({:+}d) | {}",
            plant.id,
            plant.name,
            plant.status.as_str(),
            plant.next_watering,
            days_until(plant.next_watering, today),
            sensor
        );
    }
    Ok(())
}

fn show(ctx: &AppContext, selector: &str, json: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let today = ctx.clock().today();
    let user = ctx.current_user(&store)?;
    let plant = resolve_plant(&store, &user.id, selector)?;

    if json {
        let names = type_name_map(&store)?;
        println!(
            "{}",
            serde_json::to_string_pretty(&plant_json(&plant, &names, today))?
        );
        return Ok(());
    }

    let plant_type = store
        .get_plant_type(&plant.plant_type_id)?
        .map(|t| t.name)
        .unwrap_or_else(|| "unknown".to_string());
    println!("ID: {}", plant.id);
    println!("Name: {}", plant.name);
    println!("Type: {}", plant_type);
    if let Some(location) = &plant.location {
        println!("Location: {}", location);
    }
    println!("Status: {}", plant.status.as_str());
    println!(
        "Watering: last {} / next {} ({:+}d)",
        plant.last_watered,
        plant.next_watering,
        days_until(plant.next_watering, today)
    );
    println!(
        "Fertilizing: last {} / next {} ({:+}d)",
        plant.last_fertilized,
        plant.next_fertilizing,
        days_until(plant.next_fertilizing, today)
    );
    match (plant.last_repotted, plant.next_repotting) {
        (Some(last), Some(next)) => println!("Repotting: last {} / next {}", last, next),
        (Some(last), None) => println!("Repotting: last {}", last),
        _ => println!("Repotting: never recorded"),
    }
    if plant.has_sensor {
        match store.latest_reading(&plant.id)? {
            Some(reading) => {
                let soil = reading
                    .soil_humidity
                    .map(|v| format!("{}%", v))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "Sensor: {} °C, soil {}, {} lux at {}",
                    reading.temperature, soil, reading.light_level, reading.recorded_at
                );
            }
            None => println!("Sensor: assigned, no readings yet"),
        }
    }
    if let Some(notes) = &plant.notes {
        println!("Notes: {}", notes);
    }
    Ok(())
}

fn update(
    ctx: &AppContext,
    selector: &str,
    name: Option<String>,
    location: Option<String>,
    notes: Option<String>,
) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    let clock = ctx.clock();
    let user = ctx.current_user(&store)?;
    let plant = resolve_plant(&store, &user.id, selector)?;

    let updated = update_plant_details(
        &mut store, &clock, &user.id, &plant.id, name, location, notes,
    )?;
    if !ctx.quiet() {
        println!("Updated plant {}", updated.name);
    }
    Ok(())
}

fn remove(ctx: &AppContext, selector: &str) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    let user = ctx.current_user(&store)?;
    let plant = resolve_plant(&store, &user.id, selector)?;

    delete_plant(&mut store, &user.id, &plant.id)?;
    if !ctx.quiet() {
        println!("Removed plant {} and its tasks and readings", plant.name);
    }
    Ok(())
}

fn refresh(ctx: &AppContext, selector: &str) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    let clock = ctx.clock();
    let user = ctx.current_user(&store)?;
    let plant = resolve_plant(&store, &user.id, selector)?;

    let status = refresh_status(&mut store, &clock, &plant.id)?;
    if !ctx.quiet() {
        println!("{}: {}", plant.name, status.as_str());
    }
    Ok(())
}
