use plantcare_core::model::{NewReading, SensorReading};
use plantcare_core::sensors::{
    all_readings, assign_sensor, latest_reading, readings_window, record_reading,
    unassign_sensor, ReadingPeriod,
};
use plantcare_core::PlantStore;

use crate::app::AppContext;
use crate::cli::{SensorCommands, SensorRecordArgs};
use crate::helpers::resolve_plant;
use crate::output::reading_json;

pub fn run(ctx: &AppContext, command: &SensorCommands) -> anyhow::Result<()> {
    match command {
        SensorCommands::Record(args) => record(ctx, args),
        SensorCommands::Assign { plant } => assign(ctx, plant),
        SensorCommands::Unassign { plant } => unassign(ctx, plant),
        SensorCommands::Latest { plant, json } => latest(ctx, plant, *json),
        SensorCommands::List {
            plant,
            period,
            json,
        } => list(ctx, plant, period.as_deref(), *json),
        SensorCommands::Export { plant, format } => export(ctx, plant, format),
    }
}

fn record(ctx: &AppContext, args: &SensorRecordArgs) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    let clock = ctx.clock();
    let user = ctx.current_user(&store)?;
    let plant = resolve_plant(&store, &user.id, &args.plant)?;

    let reading = record_reading(
        &mut store,
        &clock,
        &user.id,
        &NewReading {
            plant_id: plant.id,
            temperature: args.temperature,
            soil_humidity: args.soil,
            air_humidity: args.air,
            light_level: args.light,
        },
        args.refresh,
    )?;

    if !ctx.quiet() {
        println!("Recorded reading {} for {}", reading.id, plant.name);
        if args.refresh {
            let plant = store
                .get_plant(&plant.id)?
                .ok_or_else(|| anyhow::anyhow!("Plant disappeared during refresh"))?;
            println!("Status: {}", plant.status.as_str());
        }
    }
    Ok(())
}

fn assign(ctx: &AppContext, selector: &str) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    let clock = ctx.clock();
    let user = ctx.current_user(&store)?;
    let plant = resolve_plant(&store, &user.id, selector)?;

    let plant = assign_sensor(&mut store, &clock, &user.id, &plant.id)?;
    if !ctx.quiet() {
        println!("Assigned sensor to {}", plant.name);
    }
    Ok(())
}

fn unassign(ctx: &AppContext, selector: &str) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    let clock = ctx.clock();
    let user = ctx.current_user(&store)?;
    let plant = resolve_plant(&store, &user.id, selector)?;

    let plant = unassign_sensor(&mut store, &clock, &user.id, &plant.id)?;
    if !ctx.quiet() {
        println!("Removed sensor from {} (readings retained)", plant.name);
    }
    Ok(())
}

fn latest(ctx: &AppContext, selector: &str, json: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let user = ctx.current_user(&store)?;
    let plant = resolve_plant(&store, &user.id, selector)?;

    let reading = latest_reading(&store, &user.id, &plant.id)?;
    match reading {
        Some(reading) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&reading_json(&reading))?);
            } else {
                print_reading(&reading);
            }
        }
        None => {
            if json {
                println!("null");
            } else if !ctx.quiet() {
                println!("No readings for {}", plant.name);
            }
        }
    }
    Ok(())
}

fn list(
    ctx: &AppContext,
    selector: &str,
    period: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let clock = ctx.clock();
    let user = ctx.current_user(&store)?;
    let plant = resolve_plant(&store, &user.id, selector)?;

    let readings = match period {
        Some(value) => {
            let period = ReadingPeriod::parse(value)?;
            readings_window(&store, &clock, &user.id, &plant.id, period)?
        }
        None => all_readings(&store, &user.id, &plant.id)?,
    };

    if json {
        let values: Vec<serde_json::Value> = readings.iter().map(reading_json).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    if !ctx.quiet() {
        println!("RECORDED_AT | TEMP | SOIL | AIR | LIGHT");
    }
    for reading in readings {
        println!(
            "{} | {} | {} | {} | {}",
            reading.recorded_at,
            reading.temperature,
            opt_pct(reading.soil_humidity),
            opt_pct(reading.air_humidity),
            reading.light_level
        );
    }
    Ok(())
}

fn export(ctx: &AppContext, selector: &str, format: &str) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let user = ctx.current_user(&store)?;
    let plant = resolve_plant(&store, &user.id, selector)?;
    let readings = all_readings(&store, &user.id, &plant.id)?;

    match format {
        "csv" => {
            println!("recorded_at,temperature,soil_humidity,air_humidity,light_level");
            for reading in readings {
                println!(
                    "{},{},{},{},{}",
                    reading.recorded_at.to_rfc3339(),
                    reading.temperature,
                    reading
                        .soil_humidity
                        .map(|v| v.to_string())
                        .unwrap_or_default(),
                    reading
                        .air_humidity
                        .map(|v| v.to_string())
                        .unwrap_or_default(),
                    reading.light_level
                );
            }
        }
        "json" => {
            let values: Vec<serde_json::Value> = readings.iter().map(reading_json).collect();
            println!("{}", serde_json::to_string_pretty(&values)?);
        }
        other => {
            return Err(anyhow::anyhow!(
                "Unsupported export format: {} (use csv or json)",
                other
            ));
        }
    }
    Ok(())
}

fn print_reading(reading: &SensorReading) {
    println!("Recorded: {}", reading.recorded_at);
    println!("Temperature: {} °C", reading.temperature);
    println!("Soil humidity: {}", opt_pct(reading.soil_humidity));
    println!("Air humidity: {}", opt_pct(reading.air_humidity));
    println!("Light: {} lux", reading.light_level);
}

fn opt_pct(value: Option<f64>) -> String {
    value
        .map(|v| format!("{}%", v))
        .unwrap_or_else(|| "-".to_string())
}
