//! SQLite-backed store for regions and daily forecasts.
//!
//! Regions are insert-if-absent (first write wins); forecasts are replaced in
//! place (last write wins). The connection lives behind a mutex so every
//! statement, and every batch transaction, is applied whole before a reader sees it.

use chrono::NaiveDate;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::error::ForecastError;
use crate::types::{DailyForecast, Region};

type Result<T> = std::result::Result<T, ForecastError>;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Durable storage for `Region` and `DailyForecast` rows.
pub struct ForecastStore {
    conn: Mutex<Connection>,
}

impl ForecastStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ForecastError::StorageUnavailable(format!(
                    "cannot create {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;
        tracing::debug!("Opened forecast store at {}", path.display());
        Ok(store)
    }

    /// Create an in-memory store (tests and throwaway sessions).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Create the tables if they are missing. Existing rows are untouched.
    pub fn initialize(&self) -> Result<()> {
        self.conn.lock().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS regions (
                region_code TEXT PRIMARY KEY,
                region_name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS forecasts (
                region_code TEXT NOT NULL,
                forecast_date TEXT NOT NULL,
                weather_code TEXT NOT NULL,
                min_temp REAL,
                max_temp REAL,
                PRIMARY KEY (region_code, forecast_date)
            );
            "#,
        )?;
        Ok(())
    }

    /// Insert a region unless its code is already stored.
    ///
    /// Returns `true` if a row was inserted. An existing name is never changed.
    pub fn upsert_region_if_absent(&self, code: &str, name: &str) -> Result<bool> {
        let inserted = self.conn.lock().execute(
            "INSERT OR IGNORE INTO regions (region_code, region_name) VALUES (?1, ?2)",
            params![code, name],
        )?;
        Ok(inserted == 1)
    }

    /// Insert-if-absent for many regions in one transaction.
    ///
    /// Entries with a blank code or name are skipped. Returns the number of rows
    /// actually inserted; everything is committed before this returns.
    pub fn upsert_regions_if_absent(&self, regions: &[Region]) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO regions (region_code, region_name) VALUES (?1, ?2)",
            )?;
            for region in regions {
                if !region.is_well_formed() {
                    tracing::warn!("Skipping malformed region {:?}", region);
                    continue;
                }
                inserted += stmt.execute(params![region.code, region.name])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Insert or fully overwrite the forecast at `(region_code, date)`.
    pub fn replace_forecast(
        &self,
        region_code: &str,
        date: NaiveDate,
        weather_code: &str,
        min_temp: Option<f64>,
        max_temp: Option<f64>,
    ) -> Result<()> {
        self.conn.lock().execute(
            r#"
            INSERT OR REPLACE INTO forecasts
            (region_code, forecast_date, weather_code, min_temp, max_temp)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                region_code,
                date.format(DATE_FORMAT).to_string(),
                weather_code,
                min_temp,
                max_temp,
            ],
        )?;
        Ok(())
    }

    /// Replace every given day for one region as a single transaction.
    ///
    /// All-or-nothing: if any row fails the transaction rolls back and none of
    /// the batch is visible.
    pub fn replace_forecasts(&self, region_code: &str, days: &[DailyForecast]) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR REPLACE INTO forecasts
                (region_code, forecast_date, weather_code, min_temp, max_temp)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;
            for day in days {
                stmt.execute(params![
                    region_code,
                    day.date.format(DATE_FORMAT).to_string(),
                    day.weather_code,
                    day.min_temp,
                    day.max_temp,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Stored name for `code`, or `None`.
    pub fn lookup_region_name(&self, code: &str) -> Result<Option<String>> {
        let name = self
            .conn
            .lock()
            .query_row(
                "SELECT region_name FROM regions WHERE region_code = ?1",
                params![code],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }

    /// All stored days for a region, ascending by date.
    pub fn lookup_forecasts(&self, region_code: &str) -> Result<Vec<DailyForecast>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT forecast_date, weather_code, min_temp, max_temp
            FROM forecasts
            WHERE region_code = ?1
            ORDER BY forecast_date ASC
            "#,
        )?;

        let rows = stmt.query_map(params![region_code], Self::row_to_forecast)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Every stored region, ordered by code.
    pub fn list_regions(&self) -> Result<Vec<Region>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT region_code, region_name FROM regions ORDER BY region_code")?;
        let rows = stmt.query_map([], |row| {
            Ok(Region {
                code: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Number of stored days for a region.
    pub fn forecast_count(&self, region_code: &str) -> Result<usize> {
        let count: i64 = self.conn.lock().query_row(
            "SELECT COUNT(*) FROM forecasts WHERE region_code = ?1",
            params![region_code],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn row_to_forecast(row: &rusqlite::Row) -> rusqlite::Result<DailyForecast> {
        let date_str: String = row.get(0)?;
        let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(DailyForecast {
            date,
            weather_code: row.get(1)?,
            min_temp: row.get(2)?,
            max_temp: row.get(3)?,
        })
    }
}
