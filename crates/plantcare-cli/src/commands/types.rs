use plantcare_core::model::{NewPlantType, PlantType};
use plantcare_core::PlantStore;

use crate::app::AppContext;
use crate::cli::{TypeAddArgs, TypeCommands};
use crate::helpers::{range_pair, resolve_plant_type};

pub fn run(ctx: &AppContext, command: &TypeCommands) -> anyhow::Result<()> {
    match command {
        TypeCommands::Add(args) => add(ctx, args),
        TypeCommands::List { json } => list(ctx, *json),
        TypeCommands::Show { plant_type, json } => show(ctx, plant_type, *json),
        TypeCommands::Remove { plant_type } => remove(ctx, plant_type),
    }
}

fn add(ctx: &AppContext, args: &TypeAddArgs) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    let (temp_min, temp_max) = range_pair(&args.temp, "temp")?;
    let (humidity_min, humidity_max) = range_pair(&args.humidity, "humidity")?;
    let (light_min, light_max) = range_pair(&args.light, "light")?;

    let id = store.insert_plant_type(&NewPlantType {
        name: args.name.clone(),
        scientific_name: args.scientific_name.clone(),
        watering_frequency_days: args.watering_days,
        fertilizing_frequency_days: args.fertilizing_days,
        repotting_frequency_months: args.repotting_months,
        optimal_temp_min: temp_min,
        optimal_temp_max: temp_max,
        optimal_humidity_min: humidity_min,
        optimal_humidity_max: humidity_max,
        optimal_light_min: light_min,
        optimal_light_max: light_max,
        care_tips: args.care_tips.clone(),
    })?;

    if !ctx.quiet() {
        println!("Added plant type {} ({})", args.name, id);
    }
    Ok(())
}

fn list(ctx: &AppContext, json: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let types = store.list_plant_types()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&types)?);
        return Ok(());
    }

    if !ctx.quiet() {
        println!("ID | NAME | WATER | FERTILIZE | REPOT");
    }
    for plant_type in types {
        let repot = plant_type
            .repotting_frequency_months
            .map(|m| format!("{}mo", m))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} | {} | {}d | {}d | {}",
            plant_type.id,
            plant_type.name,
            plant_type.watering_frequency_days,
            plant_type.fertilizing_frequency_days,
            repot
        );
    }
    Ok(())
}

fn show(ctx: &AppContext, selector: &str, json: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let plant_type = resolve_plant_type(&store, selector)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plant_type)?);
        return Ok(());
    }

    print_type(&plant_type);
    Ok(())
}

fn print_type(plant_type: &PlantType) {
    println!("ID: {}", plant_type.id);
    println!("Name: {}", plant_type.name);
    if let Some(scientific) = &plant_type.scientific_name {
        println!("Scientific name: {}", scientific);
    }
    println!("Watering: every {} days", plant_type.watering_frequency_days);
    println!(
        "Fertilizing: every {} days",
        plant_type.fertilizing_frequency_days
    );
    match plant_type.repotting_frequency_months {
        Some(months) => println!("Repotting: every {} months", months),
        None => println!("Repotting: not scheduled"),
    }
    println!(
        "Optimal temperature: {}..{} °C",
        plant_type.optimal_temp_min, plant_type.optimal_temp_max
    );
    println!(
        "Optimal soil humidity: {}..{} %",
        plant_type.optimal_humidity_min, plant_type.optimal_humidity_max
    );
    println!(
        "Optimal light: {}..{} lux",
        plant_type.optimal_light_min, plant_type.optimal_light_max
    );
    if let Some(tips) = &plant_type.care_tips {
        println!("Care tips: {}", tips);
    }
}

fn remove(ctx: &AppContext, selector: &str) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    let plant_type = resolve_plant_type(&store, selector)?;
    store.delete_plant_type(&plant_type.id)?;

    if !ctx.quiet() {
        println!("Removed plant type {}", plant_type.name);
    }
    Ok(())
}
