use std::path::PathBuf;

use plantcare_core::{PlantStore, SqliteStore};

use crate::app::AppContext;
use crate::cli::InitArgs;
use crate::config::{
    default_config_path, default_database_path, write_config, PlantcareConfig,
};

pub fn run(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let path = match &args.path {
        Some(path) => PathBuf::from(path),
        None => match ctx.database_path() {
            Ok(path) => path,
            Err(_) => default_database_path()?,
        },
    };

    if path.exists() {
        return Err(anyhow::anyhow!(
            "A database already exists at {}",
            path.display()
        ));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Opening creates the file and schema.
    let store = SqliteStore::open(&path)?;
    store.check_integrity()?;

    if args.save_config {
        let config_path = match &args.config_path {
            Some(value) => PathBuf::from(value),
            None => default_config_path()?,
        };
        write_config(&config_path, &PlantcareConfig::new(path.clone()))?;
        if !ctx.quiet() {
            println!("Wrote config to {}", config_path.display());
        }
    }

    if !ctx.quiet() {
        println!("Initialized plantcare database at {}", path.display());
    }
    Ok(())
}
