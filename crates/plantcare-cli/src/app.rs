//! Application context for the Plantcare CLI.
//!
//! Bundles the parsed CLI arguments with the lazily-loaded config file so
//! handlers do not each re-resolve the database path and acting user.

use std::path::PathBuf;

use once_cell::unsync::OnceCell;
use uuid::Uuid;

use plantcare_core::model::User;
use plantcare_core::{PlantStore, SqliteStore, SystemClock};

use crate::cli::Cli;
use crate::config::{
    default_config_path, default_database_path, read_config, PlantcareConfig,
};

pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<Option<PlantcareConfig>>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    pub fn clock(&self) -> SystemClock {
        SystemClock
    }

    /// The config file, if one exists. Loaded at most once.
    fn config(&self) -> anyhow::Result<&Option<PlantcareConfig>> {
        self.config.get_or_try_init(|| {
            let path = default_config_path()?;
            if path.exists() {
                read_config(&path).map(Some)
            } else {
                Ok(None)
            }
        })
    }

    /// Resolve the database path: `--database` flag or env, then the
    /// config file, then the XDG default.
    pub fn database_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.cli.database {
            return Ok(PathBuf::from(path));
        }
        if let Some(config) = self.config()? {
            return Ok(PathBuf::from(&config.database.path));
        }
        default_database_path()
    }

    /// Open the database, failing with a hint when it does not exist yet.
    pub fn open_store(&self) -> anyhow::Result<SqliteStore> {
        let path = self.database_path()?;
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "No database at {}. Run `plantcare init` first.",
                path.display()
            ));
        }
        Ok(SqliteStore::open(&path)?)
    }

    /// Resolve the acting user from `--user`/env or the config default.
    pub fn current_user(&self, store: &dyn PlantStore) -> anyhow::Result<User> {
        let selector = match &self.cli.user {
            Some(value) => value.clone(),
            None => self
                .config()?
                .as_ref()
                .and_then(|c| c.defaults.user.clone())
                .ok_or_else(|| {
                    anyhow::anyhow!("No user selected. Use --user or set defaults.user in config.")
                })?,
        };
        resolve_user(store, &selector)
    }

    /// Horizon for `care upcoming` when `--days` is not given.
    pub fn upcoming_days(&self) -> anyhow::Result<i64> {
        Ok(self
            .config()?
            .as_ref()
            .and_then(|c| c.defaults.upcoming_days)
            .unwrap_or(plantcare_core::calendar::DEFAULT_UPCOMING_DAYS))
    }
}

/// Look up a user by UUID or email.
pub fn resolve_user(store: &dyn PlantStore, selector: &str) -> anyhow::Result<User> {
    if let Ok(id) = Uuid::parse_str(selector) {
        return store
            .get_user(&id)?
            .ok_or_else(|| anyhow::anyhow!("User {} not found", selector));
    }
    store
        .list_users()?
        .into_iter()
        .find(|u| u.email == selector)
        .ok_or_else(|| anyhow::anyhow!("User {} not found", selector))
}
