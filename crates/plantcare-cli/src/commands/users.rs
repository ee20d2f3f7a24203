use plantcare_core::model::NewUser;
use plantcare_core::{Clock, PlantStore};

use crate::app::{resolve_user, AppContext};
use crate::cli::UserCommands;
use crate::output::user_json;

pub fn run(ctx: &AppContext, command: &UserCommands) -> anyhow::Result<()> {
    match command {
        UserCommands::Add { email, username } => add(ctx, email, username.as_deref()),
        UserCommands::List { json } => list(ctx, *json),
        UserCommands::Show { user, json } => show(ctx, user, *json),
    }
}

fn add(ctx: &AppContext, email: &str, username: Option<&str>) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    let username = username
        .map(str::to_string)
        .or_else(|| email.split('@').next().map(str::to_string))
        .unwrap_or_default();

    let id = store.insert_user(&NewUser {
        email: email.to_string(),
        username,
    })?;

    if !ctx.quiet() {
        println!("Added user {} ({})", email, id);
    }
    Ok(())
}

fn list(ctx: &AppContext, json: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let today = ctx.clock().today();
    let users = store.list_users()?;

    if json {
        let values: Vec<serde_json::Value> =
            users.iter().map(|u| user_json(u, today)).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    if !ctx.quiet() {
        println!("ID | EMAIL | USERNAME | PLAN");
    }
    for user in users {
        let plan = if user.is_premium_active(today) {
            "premium"
        } else {
            "free"
        };
        println!("{} | {} | {} | {}", user.id, user.email, user.username, plan);
    }
    Ok(())
}

fn show(ctx: &AppContext, selector: &str, json: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let today = ctx.clock().today();
    let user = resolve_user(&store, selector)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user_json(&user, today))?);
        return Ok(());
    }

    println!("ID: {}", user.id);
    println!("Email: {}", user.email);
    println!("Username: {}", user.username);
    match user.premium_end_date {
        Some(end) if user.is_premium_active(today) => {
            println!("Plan: premium (until {})", end)
        }
        _ => println!("Plan: free"),
    }
    println!("Plants: {}", store.count_plants(&user.id)?);
    Ok(())
}
