use plantcare_core::admin::{
    grant_premium, recompute_all_statuses, revoke_premium, system_statistics,
    DEFAULT_PREMIUM_DAYS,
};
use plantcare_core::PlantStore;

use crate::app::{resolve_user, AppContext};
use crate::cli::AdminCommands;

pub fn run(ctx: &AppContext, command: &AdminCommands) -> anyhow::Result<()> {
    match command {
        AdminCommands::Stats { json } => stats(ctx, *json),
        AdminCommands::GrantPremium { user, days } => grant(ctx, user, *days),
        AdminCommands::RevokePremium { user } => revoke(ctx, user),
        AdminCommands::Recompute => recompute(ctx),
        AdminCommands::Check => check(ctx),
        AdminCommands::Backup { destination } => backup(ctx, destination),
        AdminCommands::Restore { source } => restore(ctx, source),
    }
}

fn stats(ctx: &AppContext, json: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let clock = ctx.clock();
    let stats = system_statistics(&store, &clock)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Users: {} total", stats.total_users);
    println!("  premium: {}", stats.premium_users);
    println!("  free: {}", stats.free_users);
    println!("Plants: {} total", stats.total_plants);
    for (status, count) in &stats.plant_statuses {
        println!("  {}: {}", status, count);
    }
    println!("Plants with sensors: {}", stats.plants_with_sensors);
    Ok(())
}

fn grant(ctx: &AppContext, selector: &str, days: Option<i64>) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    let clock = ctx.clock();
    let user = resolve_user(&store, selector)?;
    let days = days.unwrap_or(DEFAULT_PREMIUM_DAYS);

    grant_premium(&mut store, &clock, &user.id, days)?;
    if !ctx.quiet() {
        println!("Granted premium to {} for {} days", user.email, days);
    }
    Ok(())
}

fn revoke(ctx: &AppContext, selector: &str) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    let user = resolve_user(&store, selector)?;

    revoke_premium(&mut store, &user.id)?;
    if !ctx.quiet() {
        println!("Revoked premium for {}", user.email);
    }
    Ok(())
}

fn recompute(ctx: &AppContext) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    let clock = ctx.clock();

    let report = recompute_all_statuses(&mut store, &clock)?;
    if !ctx.quiet() {
        println!(
            "Recomputed {} plant statuses ({} failures)",
            report.plants_seen, report.failures
        );
    }
    if report.failures > 0 {
        return Err(anyhow::anyhow!(
            "{} plants failed to recompute",
            report.failures
        ));
    }
    Ok(())
}

fn check(ctx: &AppContext) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    match store.check_integrity() {
        Ok(()) => {
            if !ctx.quiet() {
                println!("Integrity check: OK");
                println!("- foreign keys: OK");
                println!("- orphaned tasks and readings: none");
                println!("- completion timestamps: OK");
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("Integrity check: FAILED");
            eprintln!("- error: {}", err);
            Err(anyhow::anyhow!("Integrity check failed"))
        }
    }
}

fn backup(ctx: &AppContext, destination: &str) -> anyhow::Result<()> {
    let source = ctx.database_path()?;
    let count = std::fs::copy(&source, destination).map_err(|e| {
        anyhow::anyhow!(
            "Failed to copy database from {} to {}: {}",
            source.display(),
            destination,
            e
        )
    })?;
    if count == 0 {
        return Err(anyhow::anyhow!("Backup failed: zero bytes written"));
    }
    if !ctx.quiet() {
        println!("Backed up database to {}", destination);
    }
    Ok(())
}

fn restore(ctx: &AppContext, source: &str) -> anyhow::Result<()> {
    let target = ctx.database_path()?;

    // Verify the backup opens and passes integrity before touching the
    // live database.
    let backup_store = plantcare_core::SqliteStore::open(std::path::Path::new(source))?;
    backup_store.check_integrity()?;
    drop(backup_store);

    if target.exists() {
        let safety = target.with_extension("db.before_restore");
        std::fs::copy(&target, &safety).map_err(|e| {
            anyhow::anyhow!("Failed to preserve current database: {}", e)
        })?;
        if !ctx.quiet() {
            println!("Preserved current database at {}", safety.display());
        }
    }

    std::fs::copy(source, &target).map_err(|e| {
        anyhow::anyhow!("Failed to restore from {}: {}", source, e)
    })?;
    if !ctx.quiet() {
        println!("Restored database from {}", source);
    }
    Ok(())
}
