use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Days, Local, LocalResult, NaiveDateTime, NaiveTime, TimeZone, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Start of the local calendar day containing `day`, as a UTC instant.
fn local_midnight(day: chrono::NaiveDate) -> DateTime<Utc> {
    let naive = NaiveDateTime::new(day, NaiveTime::MIN);
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        // Midnight skipped by a DST gap; fall back to reading it as UTC
        LocalResult::None => Utc.from_utc_datetime(&naive),
    }
}

/// Half-open `[start, end)` bounds of the local day containing `instant`.
fn local_day_bounds(instant: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let day = instant.with_timezone(&Local).date_naive();
    let next = day.checked_add_days(Days::new(1)).unwrap_or(day);
    (local_midnight(day), local_midnight(next))
}

fn map_workout_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Workout> {
    Ok(Workout {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        started_at: parse_datetime(&row.get::<_, String>(3)?),
        completed_at: row.get::<_, Option<String>>(4)?.map(|s| parse_datetime(&s)),
        notes: row.get(5)?,
    })
}

fn map_exercise_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Exercise> {
    Ok(Exercise {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: parse_datetime(&row.get::<_, String>(2)?),
        updated_at: parse_datetime(&row.get::<_, String>(3)?),
    })
}

fn map_link_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<WorkoutExercise> {
    Ok(WorkoutExercise {
        id: row.get(0)?,
        workout_id: row.get(1)?,
        exercise_id: row.get(2)?,
        position: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

fn map_set_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Set> {
    Ok(Set {
        id: row.get(0)?,
        workout_exercise_id: row.get(1)?,
        set_number: row.get(2)?,
        reps: row.get(3)?,
        weight: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Exercise catalog operations

    fn list_exercises(&self) -> Result<Vec<Exercise>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, created_at, updated_at FROM exercises ORDER BY name",
        )?;

        let rows = stmt.query_map([], map_exercise_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn get_exercise(&self, id: i64) -> Result<Option<Exercise>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, created_at, updated_at FROM exercises WHERE id = ?1",
            params![id],
            map_exercise_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_exercise_by_name(&self, name: &str) -> Result<Option<Exercise>> {
        // name is COLLATE NOCASE, so this match is case-insensitive
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, created_at, updated_at FROM exercises WHERE name = ?1",
            params![name],
            map_exercise_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn create_exercise(&self, name: &str) -> Result<Exercise> {
        let conn = self.conn();
        let now = Utc::now();

        let result = conn.execute(
            "INSERT INTO exercises (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![name, format_datetime(&now)],
        );

        match result {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => return Err(Error::AlreadyExists),
            Err(e) => return Err(Error::from(e)),
        }

        Ok(Exercise {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    // Workout operations

    fn create_workout(&self, workout: &NewWorkout) -> Result<Workout> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO workouts (user_id, name, started_at, notes) VALUES (?1, ?2, ?3, ?4)",
            params![
                workout.user_id,
                workout.name,
                format_datetime(&workout.started_at),
                workout.notes,
            ],
        )?;

        Ok(Workout {
            id: conn.last_insert_rowid(),
            user_id: workout.user_id.clone(),
            name: workout.name.clone(),
            started_at: workout.started_at,
            completed_at: None,
            notes: workout.notes.clone(),
        })
    }

    fn get_workout(&self, id: i64, user_id: &str) -> Result<Option<Workout>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, user_id, name, started_at, completed_at, notes
             FROM workouts WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
            map_workout_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_workouts_for_day(
        &self,
        user_id: &str,
        date: DateTime<Utc>,
    ) -> Result<Vec<WorkoutWithExercises>> {
        let (start, end) = local_day_bounds(date);

        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, started_at, completed_at, notes
             FROM workouts
             WHERE user_id = ?1 AND started_at >= ?2 AND started_at < ?3
             ORDER BY started_at",
        )?;

        let workouts = stmt
            .query_map(
                params![user_id, format_datetime(&start), format_datetime(&end)],
                map_workout_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // Distinct summaries in first-appearance order
        let mut summary_stmt = conn.prepare(
            "SELECT e.id, e.name
             FROM workout_exercises we
             JOIN exercises e ON we.exercise_id = e.id
             WHERE we.workout_id = ?1
             GROUP BY e.id, e.name
             ORDER BY MIN(we.position)",
        )?;

        let mut enriched = Vec::with_capacity(workouts.len());
        for workout in workouts {
            let exercises = summary_stmt
                .query_map(params![workout.id], |row| {
                    Ok(ExerciseSummary {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            enriched.push(WorkoutWithExercises { workout, exercises });
        }

        Ok(enriched)
    }

    fn update_workout(
        &self,
        id: i64,
        user_id: &str,
        changes: &WorkoutChanges,
    ) -> Result<Option<Workout>> {
        let conn = self.conn();
        let rows = conn.execute(
            "UPDATE workouts SET name = ?1, started_at = ?2, notes = ?3
             WHERE id = ?4 AND user_id = ?5",
            params![
                changes.name,
                format_datetime(&changes.started_at),
                changes.notes,
                id,
                user_id,
            ],
        )?;

        if rows == 0 {
            return Ok(None);
        }

        conn.query_row(
            "SELECT id, user_id, name, started_at, completed_at, notes
             FROM workouts WHERE id = ?1",
            params![id],
            map_workout_row,
        )
        .optional()
        .map_err(Error::from)
    }

    // Workout-exercise link operations

    fn add_exercise_to_workout(
        &self,
        workout_id: i64,
        exercise_id: i64,
        user_id: &str,
    ) -> Result<Option<WorkoutExercise>> {
        // Ownership check and next-position computation happen inside the
        // insert itself, so concurrent appends cannot observe the same max.
        let conn = self.conn();
        let rows = conn.execute(
            "INSERT INTO workout_exercises (workout_id, exercise_id, position, created_at)
             SELECT ?1, ?2,
                    COALESCE((SELECT MAX(position) + 1 FROM workout_exercises WHERE workout_id = ?1), 0),
                    ?3
             WHERE EXISTS (SELECT 1 FROM workouts WHERE id = ?1 AND user_id = ?4)",
            params![
                workout_id,
                exercise_id,
                format_datetime(&Utc::now()),
                user_id,
            ],
        )?;

        if rows == 0 {
            return Ok(None);
        }

        conn.query_row(
            "SELECT id, workout_id, exercise_id, position, created_at
             FROM workout_exercises WHERE id = ?1",
            params![conn.last_insert_rowid()],
            map_link_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_exercises_with_sets(
        &self,
        workout_id: i64,
        user_id: &str,
    ) -> Result<Vec<WorkoutExerciseWithSets>> {
        let conn = self.conn();

        let owned: Option<i64> = conn
            .query_row(
                "SELECT id FROM workouts WHERE id = ?1 AND user_id = ?2",
                params![workout_id, user_id],
                |row| row.get(0),
            )
            .optional()?;

        if owned.is_none() {
            return Ok(Vec::new());
        }

        let mut link_stmt = conn.prepare(
            "SELECT we.id, we.exercise_id, e.name, we.position
             FROM workout_exercises we
             JOIN exercises e ON we.exercise_id = e.id
             WHERE we.workout_id = ?1
             ORDER BY we.position",
        )?;

        let links = link_stmt
            .query_map(params![workout_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut set_stmt = conn.prepare(
            "SELECT id, workout_exercise_id, set_number, reps, weight, created_at
             FROM sets WHERE workout_exercise_id = ?1
             ORDER BY set_number",
        )?;

        let mut result = Vec::with_capacity(links.len());
        for (id, exercise_id, exercise_name, position) in links {
            let sets = set_stmt
                .query_map(params![id], map_set_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            result.push(WorkoutExerciseWithSets {
                id,
                exercise_id,
                exercise_name,
                position,
                sets,
            });
        }

        Ok(result)
    }

    fn remove_exercise_from_workout(
        &self,
        workout_exercise_id: i64,
        user_id: &str,
    ) -> Result<Option<WorkoutExercise>> {
        let mut conn = self.conn();

        let link = conn
            .query_row(
                "SELECT we.id, we.workout_id, we.exercise_id, we.position, we.created_at
                 FROM workout_exercises we
                 JOIN workouts w ON we.workout_id = w.id
                 WHERE we.id = ?1 AND w.user_id = ?2",
                params![workout_exercise_id, user_id],
                map_link_row,
            )
            .optional()?;

        let Some(link) = link else {
            return Ok(None);
        };

        // Sets are removed explicitly rather than via engine-level cascade
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM sets WHERE workout_exercise_id = ?1",
            params![workout_exercise_id],
        )?;
        tx.execute(
            "DELETE FROM workout_exercises WHERE id = ?1",
            params![workout_exercise_id],
        )?;
        tx.commit()?;

        Ok(Some(link))
    }

    // Set operations

    fn create_set(&self, set: &NewSet, user_id: &str) -> Result<Option<Set>> {
        let conn = self.conn();
        let rows = conn.execute(
            "INSERT INTO sets (workout_exercise_id, set_number, reps, weight, created_at)
             SELECT ?1,
                    COALESCE((SELECT MAX(set_number) + 1 FROM sets WHERE workout_exercise_id = ?1), 1),
                    ?2, ?3, ?4
             WHERE EXISTS (
                 SELECT 1 FROM workout_exercises we
                 JOIN workouts w ON we.workout_id = w.id
                 WHERE we.id = ?1 AND w.user_id = ?5
             )",
            params![
                set.workout_exercise_id,
                set.reps,
                set.weight,
                format_datetime(&Utc::now()),
                user_id,
            ],
        )?;

        if rows == 0 {
            return Ok(None);
        }

        conn.query_row(
            "SELECT id, workout_exercise_id, set_number, reps, weight, created_at
             FROM sets WHERE id = ?1",
            params![conn.last_insert_rowid()],
            map_set_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn update_set(
        &self,
        set_id: i64,
        changes: &SetChanges,
        user_id: &str,
    ) -> Result<Option<Set>> {
        // Full replace: both columns are written, absent fields clear
        let conn = self.conn();
        let rows = conn.execute(
            "UPDATE sets SET reps = ?1, weight = ?2
             WHERE id = ?3 AND EXISTS (
                 SELECT 1 FROM workout_exercises we
                 JOIN workouts w ON we.workout_id = w.id
                 WHERE we.id = sets.workout_exercise_id AND w.user_id = ?4
             )",
            params![changes.reps, changes.weight, set_id, user_id],
        )?;

        if rows == 0 {
            return Ok(None);
        }

        conn.query_row(
            "SELECT id, workout_exercise_id, set_number, reps, weight, created_at
             FROM sets WHERE id = ?1",
            params![set_id],
            map_set_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn delete_set(&self, set_id: i64, user_id: &str) -> Result<Option<Set>> {
        let conn = self.conn();

        let set = conn
            .query_row(
                "SELECT s.id, s.workout_exercise_id, s.set_number, s.reps, s.weight, s.created_at
                 FROM sets s
                 JOIN workout_exercises we ON s.workout_exercise_id = we.id
                 JOIN workouts w ON we.workout_id = w.id
                 WHERE s.id = ?1 AND w.user_id = ?2",
                params![set_id, user_id],
                map_set_row,
            )
            .optional()?;

        let Some(set) = set else {
            return Ok(None);
        };

        // Ownership is checked again inside the same statement as the delete
        conn.execute(
            "DELETE FROM sets
             WHERE id = ?1 AND EXISTS (
                 SELECT 1 FROM workout_exercises we
                 JOIN workouts w ON we.workout_id = w.id
                 WHERE we.id = sets.workout_exercise_id AND w.user_id = ?2
             )",
            params![set_id, user_id],
        )?;

        Ok(Some(set))
    }

    // Token operations

    fn create_access_token(&self, token: &AccessToken) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO access_tokens (id, token_hash, token_lookup, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                token.id,
                token.token_hash,
                token.token_lookup,
                token.user_id,
                format_datetime(&token.created_at),
                token.expires_at.as_ref().map(format_datetime),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(Error::TokenLookupCollision),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_access_token_by_lookup(&self, lookup: &str) -> Result<Option<AccessToken>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, token_hash, token_lookup, user_id, created_at, expires_at, last_used_at
             FROM access_tokens WHERE token_lookup = ?1",
            params![lookup],
            |row| {
                Ok(AccessToken {
                    id: row.get(0)?,
                    token_hash: row.get(1)?,
                    token_lookup: row.get(2)?,
                    user_id: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                    expires_at: row.get::<_, Option<String>>(5)?.map(|s| parse_datetime(&s)),
                    last_used_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn update_access_token_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE access_tokens SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    fn has_access_tokens(&self) -> Result<bool> {
        let conn = self.conn();
        let count: i32 = conn.query_row("SELECT COUNT(*) FROM access_tokens", [], |row| {
            row.get(0)
        })?;
        Ok(count > 0)
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
