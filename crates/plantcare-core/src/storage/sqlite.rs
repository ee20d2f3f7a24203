//! SQLite storage backend.
//!
//! Plain file-backed SQLite with foreign keys enforced: deleting a plant
//! cascades to its care tasks and sensor readings, and a plant type cannot
//! be deleted while plants reference it. Dates are stored as `YYYY-MM-DD`
//! text, timestamps as RFC 3339 text.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::{CareError, Result};
use crate::model::{
    CareTask, NewPlantType, NewUser, PlantStatus, PlantType, SensorReading, TaskType, User,
    UserPlant,
};
use crate::storage::traits::{PlantStore, TaskFilter};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    username TEXT NOT NULL,
    is_premium INTEGER NOT NULL DEFAULT 0,
    premium_end_date TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS plant_types (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    scientific_name TEXT,
    watering_frequency_days INTEGER NOT NULL,
    fertilizing_frequency_days INTEGER NOT NULL,
    repotting_frequency_months INTEGER,
    optimal_temp_min REAL NOT NULL,
    optimal_temp_max REAL NOT NULL,
    optimal_humidity_min INTEGER NOT NULL,
    optimal_humidity_max INTEGER NOT NULL,
    optimal_light_min INTEGER NOT NULL,
    optimal_light_max INTEGER NOT NULL,
    care_tips TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_plants (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    plant_type_id TEXT NOT NULL,
    name TEXT NOT NULL,
    location TEXT,
    last_watered TEXT NOT NULL,
    last_fertilized TEXT NOT NULL,
    last_repotted TEXT,
    next_watering TEXT NOT NULL,
    next_fertilizing TEXT NOT NULL,
    next_repotting TEXT,
    status TEXT NOT NULL,
    has_sensor INTEGER NOT NULL DEFAULT 0,
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY(plant_type_id) REFERENCES plant_types(id) ON DELETE RESTRICT
);

CREATE TABLE IF NOT EXISTS care_tasks (
    id TEXT PRIMARY KEY,
    plant_id TEXT NOT NULL,
    scheduled_date TEXT NOT NULL,
    task_type TEXT NOT NULL,
    is_completed INTEGER NOT NULL DEFAULT 0,
    completed_at TEXT,
    skipped INTEGER NOT NULL DEFAULT 0,
    auto_adjusted INTEGER NOT NULL DEFAULT 0,
    notes TEXT,
    created_at TEXT NOT NULL,

    FOREIGN KEY(plant_id) REFERENCES user_plants(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_care_tasks_plant_date
    ON care_tasks(plant_id, scheduled_date);
CREATE INDEX IF NOT EXISTS idx_care_tasks_date_completed
    ON care_tasks(scheduled_date, is_completed);

CREATE TABLE IF NOT EXISTS sensor_readings (
    id TEXT PRIMARY KEY,
    plant_id TEXT NOT NULL,
    temperature REAL NOT NULL,
    soil_humidity REAL,
    air_humidity REAL,
    light_level INTEGER NOT NULL,
    recorded_at TEXT NOT NULL,

    FOREIGN KEY(plant_id) REFERENCES user_plants(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_sensor_readings_plant_time
    ON sensor_readings(plant_id, recorded_at);
"#;

const DATE_FMT: &str = "%Y-%m-%d";

/// SQLite-backed plant store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create or open a database file, initializing the schema if needed.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(sqlite_error)?;
        Self::init(conn)
    }

    /// Open a fresh in-memory database (tests and dry runs).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(sqlite_error)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(sqlite_error)?;
        conn.execute_batch(SCHEMA).map_err(sqlite_error)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CareError::Storage("SQLite connection poisoned".to_string()))
    }
}

fn sqlite_error(err: rusqlite::Error) -> CareError {
    CareError::Storage(format!("SQLite error: {}", err))
}

fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| CareError::Storage(format!("Invalid UUID: {}", e)))
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FMT)
        .map_err(|e| CareError::Storage(format!("Invalid date: {}", e)))
}

fn parse_opt_date(value: Option<String>) -> Result<Option<NaiveDate>> {
    value.as_deref().map(parse_date).transpose()
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CareError::Storage(format!("Invalid timestamp: {}", e)))
}

fn fmt_date(date: NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

fn fmt_opt_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(fmt_date)
}

type SqlResult<T> = std::result::Result<T, rusqlite::Error>;

fn user_columns(row: &Row<'_>) -> SqlResult<(String, String, String, bool, Option<String>, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn user_from_columns(
    (id, email, username, is_premium, premium_end, created_at): (
        String,
        String,
        String,
        bool,
        Option<String>,
        String,
    ),
) -> Result<User> {
    Ok(User {
        id: parse_uuid(&id)?,
        email,
        username,
        is_premium,
        premium_end_date: parse_opt_date(premium_end)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

const USER_COLS: &str = "id, email, username, is_premium, premium_end_date, created_at";

#[allow(clippy::type_complexity)]
fn plant_type_columns(
    row: &Row<'_>,
) -> SqlResult<(
    String,
    String,
    Option<String>,
    u32,
    u32,
    Option<u32>,
    f64,
    f64,
    u32,
    u32,
    u32,
    u32,
    Option<String>,
    String,
)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
        row.get(11)?,
        row.get(12)?,
        row.get(13)?,
    ))
}

#[allow(clippy::type_complexity)]
fn plant_type_from_columns(
    (
        id,
        name,
        scientific_name,
        watering,
        fertilizing,
        repotting,
        temp_min,
        temp_max,
        humidity_min,
        humidity_max,
        light_min,
        light_max,
        care_tips,
        created_at,
    ): (
        String,
        String,
        Option<String>,
        u32,
        u32,
        Option<u32>,
        f64,
        f64,
        u32,
        u32,
        u32,
        u32,
        Option<String>,
        String,
    ),
) -> Result<PlantType> {
    Ok(PlantType {
        id: parse_uuid(&id)?,
        name,
        scientific_name,
        watering_frequency_days: watering,
        fertilizing_frequency_days: fertilizing,
        repotting_frequency_months: repotting,
        optimal_temp_min: temp_min,
        optimal_temp_max: temp_max,
        optimal_humidity_min: humidity_min,
        optimal_humidity_max: humidity_max,
        optimal_light_min: light_min,
        optimal_light_max: light_max,
        care_tips,
        created_at: parse_timestamp(&created_at)?,
    })
}

const PLANT_TYPE_COLS: &str = "id, name, scientific_name, watering_frequency_days, \
     fertilizing_frequency_days, repotting_frequency_months, optimal_temp_min, \
     optimal_temp_max, optimal_humidity_min, optimal_humidity_max, optimal_light_min, \
     optimal_light_max, care_tips, created_at";

#[allow(clippy::type_complexity)]
fn plant_columns(
    row: &Row<'_>,
) -> SqlResult<(
    String,
    String,
    String,
    String,
    Option<String>,
    String,
    String,
    Option<String>,
    String,
    String,
    Option<String>,
    String,
    bool,
    Option<String>,
    String,
    String,
)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
        row.get(11)?,
        row.get(12)?,
        row.get(13)?,
        row.get(14)?,
        row.get(15)?,
    ))
}

#[allow(clippy::type_complexity)]
fn plant_from_columns(
    (
        id,
        user_id,
        plant_type_id,
        name,
        location,
        last_watered,
        last_fertilized,
        last_repotted,
        next_watering,
        next_fertilizing,
        next_repotting,
        status,
        has_sensor,
        notes,
        created_at,
        updated_at,
    ): (
        String,
        String,
        String,
        String,
        Option<String>,
        String,
        String,
        Option<String>,
        String,
        String,
        Option<String>,
        String,
        bool,
        Option<String>,
        String,
        String,
    ),
) -> Result<UserPlant> {
    Ok(UserPlant {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        plant_type_id: parse_uuid(&plant_type_id)?,
        name,
        location,
        last_watered: parse_date(&last_watered)?,
        last_fertilized: parse_date(&last_fertilized)?,
        last_repotted: parse_opt_date(last_repotted)?,
        next_watering: parse_date(&next_watering)?,
        next_fertilizing: parse_date(&next_fertilizing)?,
        next_repotting: parse_opt_date(next_repotting)?,
        status: PlantStatus::parse(&status)?,
        has_sensor,
        notes,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

const PLANT_COLS: &str = "id, user_id, plant_type_id, name, location, last_watered, \
     last_fertilized, last_repotted, next_watering, next_fertilizing, next_repotting, \
     status, has_sensor, notes, created_at, updated_at";

#[allow(clippy::type_complexity)]
fn task_columns(
    row: &Row<'_>,
) -> SqlResult<(
    String,
    String,
    String,
    String,
    bool,
    Option<String>,
    bool,
    bool,
    Option<String>,
    String,
)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
    ))
}

#[allow(clippy::type_complexity)]
fn task_from_columns(
    (
        id,
        plant_id,
        scheduled_date,
        task_type,
        is_completed,
        completed_at,
        skipped,
        auto_adjusted,
        notes,
        created_at,
    ): (
        String,
        String,
        String,
        String,
        bool,
        Option<String>,
        bool,
        bool,
        Option<String>,
        String,
    ),
) -> Result<CareTask> {
    Ok(CareTask {
        id: parse_uuid(&id)?,
        plant_id: parse_uuid(&plant_id)?,
        scheduled_date: parse_date(&scheduled_date)?,
        task_type: TaskType::parse(&task_type)?,
        is_completed,
        completed_at: completed_at.as_deref().map(parse_timestamp).transpose()?,
        skipped,
        auto_adjusted,
        notes,
        created_at: parse_timestamp(&created_at)?,
    })
}

const TASK_COLS: &str = "id, plant_id, scheduled_date, task_type, is_completed, \
     completed_at, skipped, auto_adjusted, notes, created_at";

#[allow(clippy::type_complexity)]
fn reading_columns(
    row: &Row<'_>,
) -> SqlResult<(String, String, f64, Option<f64>, Option<f64>, u32, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn reading_from_columns(
    (id, plant_id, temperature, soil, air, light, recorded_at): (
        String,
        String,
        f64,
        Option<f64>,
        Option<f64>,
        u32,
        String,
    ),
) -> Result<SensorReading> {
    Ok(SensorReading {
        id: parse_uuid(&id)?,
        plant_id: parse_uuid(&plant_id)?,
        temperature,
        soil_humidity: soil,
        air_humidity: air,
        light_level: light,
        recorded_at: parse_timestamp(&recorded_at)?,
    })
}

const READING_COLS: &str =
    "id, plant_id, temperature, soil_humidity, air_humidity, light_level, recorded_at";

impl PlantStore for SqliteStore {
    fn insert_user(&mut self, user: &NewUser) -> Result<Uuid> {
        user.validate()?;
        let conn = self.lock()?;

        let id = Uuid::new_v4();
        let created_at = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO users (id, email, username, is_premium, premium_end_date, created_at) \
             VALUES (?, ?, ?, 0, NULL, ?)",
            (id.to_string(), &user.email, &user.username, created_at),
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                CareError::Conflict("A user with this email already exists".to_string())
            }
            other => sqlite_error(other),
        })?;

        Ok(id)
    }

    fn get_user(&self, id: &Uuid) -> Result<Option<User>> {
        let conn = self.lock()?;
        let result = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLS),
                [id.to_string()],
                user_columns,
            )
            .optional()
            .map_err(sqlite_error)?;
        result.map(user_from_columns).transpose()
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM users ORDER BY created_at ASC",
                USER_COLS
            ))
            .map_err(sqlite_error)?;
        let rows = stmt.query_map([], user_columns).map_err(sqlite_error)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(user_from_columns(row.map_err(sqlite_error)?)?);
        }
        Ok(users)
    }

    fn set_premium(
        &mut self,
        id: &Uuid,
        is_premium: bool,
        premium_end_date: Option<NaiveDate>,
    ) -> Result<()> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE users SET is_premium = ?, premium_end_date = ? WHERE id = ?",
                (
                    is_premium,
                    fmt_opt_date(premium_end_date),
                    id.to_string(),
                ),
            )
            .map_err(sqlite_error)?;
        if changed == 0 {
            return Err(CareError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    fn insert_plant_type(&mut self, plant_type: &NewPlantType) -> Result<Uuid> {
        plant_type.validate()?;
        let conn = self.lock()?;

        let id = Uuid::new_v4();
        let created_at = Utc::now().to_rfc3339();
        conn.execute(
            &format!(
                "INSERT INTO plant_types ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                PLANT_TYPE_COLS
            ),
            rusqlite::params![
                id.to_string(),
                plant_type.name,
                plant_type.scientific_name,
                plant_type.watering_frequency_days,
                plant_type.fertilizing_frequency_days,
                plant_type.repotting_frequency_months,
                plant_type.optimal_temp_min,
                plant_type.optimal_temp_max,
                plant_type.optimal_humidity_min,
                plant_type.optimal_humidity_max,
                plant_type.optimal_light_min,
                plant_type.optimal_light_max,
                plant_type.care_tips,
                created_at,
            ],
        )
        .map_err(sqlite_error)?;

        Ok(id)
    }

    fn get_plant_type(&self, id: &Uuid) -> Result<Option<PlantType>> {
        let conn = self.lock()?;
        let result = conn
            .query_row(
                &format!("SELECT {} FROM plant_types WHERE id = ?", PLANT_TYPE_COLS),
                [id.to_string()],
                plant_type_columns,
            )
            .optional()
            .map_err(sqlite_error)?;
        result.map(plant_type_from_columns).transpose()
    }

    fn list_plant_types(&self) -> Result<Vec<PlantType>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM plant_types ORDER BY name ASC",
                PLANT_TYPE_COLS
            ))
            .map_err(sqlite_error)?;
        let rows = stmt
            .query_map([], plant_type_columns)
            .map_err(sqlite_error)?;

        let mut types = Vec::new();
        for row in rows {
            types.push(plant_type_from_columns(row.map_err(sqlite_error)?)?);
        }
        Ok(types)
    }

    fn delete_plant_type(&mut self, id: &Uuid) -> Result<()> {
        let conn = self.lock()?;

        let referenced: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM user_plants WHERE plant_type_id = ?",
                [id.to_string()],
                |row| row.get(0),
            )
            .map_err(sqlite_error)?;
        if referenced > 0 {
            return Err(CareError::Conflict(
                "Plant type is referenced by existing plants".to_string(),
            ));
        }

        let changed = conn
            .execute("DELETE FROM plant_types WHERE id = ?", [id.to_string()])
            .map_err(sqlite_error)?;
        if changed == 0 {
            return Err(CareError::NotFound("Plant type not found".to_string()));
        }
        Ok(())
    }

    fn insert_plant(&mut self, plant: &UserPlant) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO user_plants ({}) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                PLANT_COLS
            ),
            rusqlite::params![
                plant.id.to_string(),
                plant.user_id.to_string(),
                plant.plant_type_id.to_string(),
                plant.name,
                plant.location,
                fmt_date(plant.last_watered),
                fmt_date(plant.last_fertilized),
                fmt_opt_date(plant.last_repotted),
                fmt_date(plant.next_watering),
                fmt_date(plant.next_fertilizing),
                fmt_opt_date(plant.next_repotting),
                plant.status.as_str(),
                plant.has_sensor,
                plant.notes,
                plant.created_at.to_rfc3339(),
                plant.updated_at.to_rfc3339(),
            ],
        )
        .map_err(sqlite_error)?;
        Ok(())
    }

    fn get_plant(&self, id: &Uuid) -> Result<Option<UserPlant>> {
        let conn = self.lock()?;
        let result = conn
            .query_row(
                &format!("SELECT {} FROM user_plants WHERE id = ?", PLANT_COLS),
                [id.to_string()],
                plant_columns,
            )
            .optional()
            .map_err(sqlite_error)?;
        result.map(plant_from_columns).transpose()
    }

    fn list_plants(&self, user_id: &Uuid) -> Result<Vec<UserPlant>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM user_plants WHERE user_id = ? ORDER BY created_at DESC",
                PLANT_COLS
            ))
            .map_err(sqlite_error)?;
        let rows = stmt
            .query_map([user_id.to_string()], plant_columns)
            .map_err(sqlite_error)?;

        let mut plants = Vec::new();
        for row in rows {
            plants.push(plant_from_columns(row.map_err(sqlite_error)?)?);
        }
        Ok(plants)
    }

    fn list_all_plants(&self) -> Result<Vec<UserPlant>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM user_plants ORDER BY created_at DESC",
                PLANT_COLS
            ))
            .map_err(sqlite_error)?;
        let rows = stmt.query_map([], plant_columns).map_err(sqlite_error)?;

        let mut plants = Vec::new();
        for row in rows {
            plants.push(plant_from_columns(row.map_err(sqlite_error)?)?);
        }
        Ok(plants)
    }

    fn count_plants(&self, user_id: &Uuid) -> Result<u32> {
        let conn = self.lock()?;
        let count: u32 = conn
            .query_row(
                "SELECT COUNT(*) FROM user_plants WHERE user_id = ?",
                [user_id.to_string()],
                |row| row.get(0),
            )
            .map_err(sqlite_error)?;
        Ok(count)
    }

    fn update_plant(&mut self, plant: &UserPlant) -> Result<()> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE user_plants SET \
                     name = ?, location = ?, last_watered = ?, last_fertilized = ?, \
                     last_repotted = ?, next_watering = ?, next_fertilizing = ?, \
                     next_repotting = ?, status = ?, has_sensor = ?, notes = ?, \
                     updated_at = ? \
                 WHERE id = ?",
                rusqlite::params![
                    plant.name,
                    plant.location,
                    fmt_date(plant.last_watered),
                    fmt_date(plant.last_fertilized),
                    fmt_opt_date(plant.last_repotted),
                    fmt_date(plant.next_watering),
                    fmt_date(plant.next_fertilizing),
                    fmt_opt_date(plant.next_repotting),
                    plant.status.as_str(),
                    plant.has_sensor,
                    plant.notes,
                    plant.updated_at.to_rfc3339(),
                    plant.id.to_string(),
                ],
            )
            .map_err(sqlite_error)?;
        if changed == 0 {
            return Err(CareError::NotFound("Plant not found".to_string()));
        }
        Ok(())
    }

    fn delete_plant(&mut self, id: &Uuid) -> Result<()> {
        let conn = self.lock()?;
        let changed = conn
            .execute("DELETE FROM user_plants WHERE id = ?", [id.to_string()])
            .map_err(sqlite_error)?;
        if changed == 0 {
            return Err(CareError::NotFound("Plant not found".to_string()));
        }
        Ok(())
    }

    fn insert_task(&mut self, task: &CareTask) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO care_tasks ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                TASK_COLS
            ),
            rusqlite::params![
                task.id.to_string(),
                task.plant_id.to_string(),
                fmt_date(task.scheduled_date),
                task.task_type.as_str(),
                task.is_completed,
                task.completed_at.map(|ts| ts.to_rfc3339()),
                task.skipped,
                task.auto_adjusted,
                task.notes,
                task.created_at.to_rfc3339(),
            ],
        )
        .map_err(sqlite_error)?;
        Ok(())
    }

    fn get_task(&self, id: &Uuid) -> Result<Option<CareTask>> {
        let conn = self.lock()?;
        let result = conn
            .query_row(
                &format!("SELECT {} FROM care_tasks WHERE id = ?", TASK_COLS),
                [id.to_string()],
                task_columns,
            )
            .optional()
            .map_err(sqlite_error)?;
        result.map(task_from_columns).transpose()
    }

    fn update_task(&mut self, task: &CareTask) -> Result<()> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE care_tasks SET \
                     is_completed = ?, completed_at = ?, skipped = ?, \
                     auto_adjusted = ?, notes = ? \
                 WHERE id = ?",
                rusqlite::params![
                    task.is_completed,
                    task.completed_at.map(|ts| ts.to_rfc3339()),
                    task.skipped,
                    task.auto_adjusted,
                    task.notes,
                    task.id.to_string(),
                ],
            )
            .map_err(sqlite_error)?;
        if changed == 0 {
            return Err(CareError::NotFound("Care task not found".to_string()));
        }
        Ok(())
    }

    fn delete_stale_pending(&mut self, plant_id: &Uuid, before: NaiveDate) -> Result<u32> {
        let conn = self.lock()?;
        let deleted = conn
            .execute(
                "DELETE FROM care_tasks \
                 WHERE plant_id = ? AND is_completed = 0 AND skipped = 0 \
                   AND scheduled_date < ?",
                (plant_id.to_string(), fmt_date(before)),
            )
            .map_err(sqlite_error)?;
        Ok(deleted as u32)
    }

    fn pending_task_exists(
        &self,
        plant_id: &Uuid,
        task_type: TaskType,
        date: NaiveDate,
    ) -> Result<bool> {
        let conn = self.lock()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM care_tasks \
                 WHERE plant_id = ? AND task_type = ? AND scheduled_date = ? \
                   AND is_completed = 0 AND skipped = 0 \
                 LIMIT 1",
                (plant_id.to_string(), task_type.as_str(), fmt_date(date)),
                |row| row.get(0),
            )
            .optional()
            .map_err(sqlite_error)?;
        Ok(found.is_some())
    }

    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<CareTask>> {
        let conn = self.lock()?;

        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(user_id) = filter.user_id {
            conditions.push("p.user_id = ?".to_string());
            params.push(Box::new(user_id.to_string()));
        }
        if let Some(plant_id) = filter.plant_id {
            conditions.push("t.plant_id = ?".to_string());
            params.push(Box::new(plant_id.to_string()));
        }
        if let Some(on) = filter.on {
            conditions.push("t.scheduled_date = ?".to_string());
            params.push(Box::new(fmt_date(on)));
        }
        if let Some(since) = filter.since {
            conditions.push("t.scheduled_date >= ?".to_string());
            params.push(Box::new(fmt_date(since)));
        }
        if let Some(until) = filter.until {
            conditions.push("t.scheduled_date <= ?".to_string());
            params.push(Box::new(fmt_date(until)));
        }
        if filter.incomplete_only {
            conditions.push("t.is_completed = 0".to_string());
        }

        let mut query = format!(
            "SELECT {} FROM care_tasks t JOIN user_plants p ON p.id = t.plant_id",
            TASK_COLS
                .split(", ")
                .map(|col| format!("t.{}", col))
                .collect::<Vec<_>>()
                .join(", ")
        );
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(" ORDER BY t.scheduled_date ASC, t.task_type ASC");

        let mut stmt = conn.prepare(&query).map_err(sqlite_error)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), task_columns)
            .map_err(sqlite_error)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(task_from_columns(row.map_err(sqlite_error)?)?);
        }
        Ok(tasks)
    }

    fn insert_reading(&mut self, reading: &SensorReading) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO sensor_readings ({}) VALUES (?, ?, ?, ?, ?, ?, ?)",
                READING_COLS
            ),
            rusqlite::params![
                reading.id.to_string(),
                reading.plant_id.to_string(),
                reading.temperature,
                reading.soil_humidity,
                reading.air_humidity,
                reading.light_level,
                reading.recorded_at.to_rfc3339(),
            ],
        )
        .map_err(sqlite_error)?;
        Ok(())
    }

    fn latest_reading(&self, plant_id: &Uuid) -> Result<Option<SensorReading>> {
        let conn = self.lock()?;
        let result = conn
            .query_row(
                &format!(
                    "SELECT {} FROM sensor_readings WHERE plant_id = ? \
                     ORDER BY recorded_at DESC LIMIT 1",
                    READING_COLS
                ),
                [plant_id.to_string()],
                reading_columns,
            )
            .optional()
            .map_err(sqlite_error)?;
        result.map(reading_from_columns).transpose()
    }

    fn list_readings(
        &self,
        plant_id: &Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<SensorReading>> {
        let conn = self.lock()?;

        let mut query = format!(
            "SELECT {} FROM sensor_readings WHERE plant_id = ?",
            READING_COLS
        );
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(plant_id.to_string())];
        if let Some(since) = since {
            query.push_str(" AND recorded_at >= ?");
            params.push(Box::new(since.to_rfc3339()));
        }
        query.push_str(" ORDER BY recorded_at ASC");

        let mut stmt = conn.prepare(&query).map_err(sqlite_error)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), reading_columns)
            .map_err(sqlite_error)?;

        let mut readings = Vec::new();
        for row in rows {
            readings.push(reading_from_columns(row.map_err(sqlite_error)?)?);
        }
        Ok(readings)
    }

    fn check_integrity(&self) -> Result<()> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare("PRAGMA foreign_key_check")
            .map_err(sqlite_error)?;
        let mut rows = stmt.query([]).map_err(sqlite_error)?;
        if rows.next().map_err(sqlite_error)?.is_some() {
            return Err(CareError::Storage(
                "Foreign key integrity check failed".to_string(),
            ));
        }

        let orphaned_tasks: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM care_tasks t \
                 LEFT JOIN user_plants p ON p.id = t.plant_id WHERE p.id IS NULL",
                [],
                |row| row.get(0),
            )
            .map_err(sqlite_error)?;
        if orphaned_tasks > 0 {
            return Err(CareError::Storage(
                "Care tasks reference missing plants".to_string(),
            ));
        }

        let orphaned_readings: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sensor_readings r \
                 LEFT JOIN user_plants p ON p.id = r.plant_id WHERE p.id IS NULL",
                [],
                |row| row.get(0),
            )
            .map_err(sqlite_error)?;
        if orphaned_readings > 0 {
            return Err(CareError::Storage(
                "Sensor readings reference missing plants".to_string(),
            ));
        }

        let completed_without_stamp: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM care_tasks \
                 WHERE is_completed = 1 AND completed_at IS NULL",
                [],
                |row| row.get(0),
            )
            .map_err(sqlite_error)?;
        if completed_without_stamp > 0 {
            return Err(CareError::Storage(
                "Completed tasks missing completion timestamps".to_string(),
            ));
        }

        Ok(())
    }
}
