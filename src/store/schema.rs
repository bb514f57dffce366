pub const SCHEMA: &str = r#"
-- Shared exercise catalog. Names are unique case-insensitively; the
-- first-entered casing is what gets displayed.
CREATE TABLE IF NOT EXISTS exercises (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL COLLATE NOCASE UNIQUE,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Workout sessions, owned by the opaque user id the caller authenticated as
CREATE TABLE IF NOT EXISTS workouts (
    id INTEGER PRIMARY KEY,
    user_id TEXT NOT NULL,
    name TEXT,
    started_at TEXT NOT NULL,
    completed_at TEXT,
    notes TEXT
);

-- Junction linking catalog exercises into workouts.
-- position is a zero-based append-only sequence per workout.
CREATE TABLE IF NOT EXISTS workout_exercises (
    id INTEGER PRIMARY KEY,
    workout_id INTEGER NOT NULL REFERENCES workouts(id),
    exercise_id INTEGER NOT NULL REFERENCES exercises(id),
    position INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Individual sets within a workout exercise.
-- set_number is a one-based append-only sequence per workout exercise;
-- weight is an exact decimal kept as text.
CREATE TABLE IF NOT EXISTS sets (
    id INTEGER PRIMARY KEY,
    workout_exercise_id INTEGER NOT NULL REFERENCES workout_exercises(id),
    set_number INTEGER NOT NULL,
    reps INTEGER,
    weight TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Bearer tokens; the bound user_id is the identity every query is scoped by
CREATE TABLE IF NOT EXISTS access_tokens (
    id TEXT PRIMARY KEY,
    token_hash TEXT NOT NULL,          -- argon2id hash with embedded salt
    token_lookup TEXT NOT NULL,        -- short prefix for fast lookup
    user_id TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),
    expires_at TEXT,            -- NULL = never
    last_used_at TEXT
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_workouts_user_started ON workouts(user_id, started_at);
CREATE INDEX IF NOT EXISTS idx_workout_exercises_workout ON workout_exercises(workout_id);
CREATE INDEX IF NOT EXISTS idx_sets_workout_exercise ON sets(workout_exercise_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_access_tokens_lookup ON access_tokens(token_lookup);
CREATE INDEX IF NOT EXISTS idx_access_tokens_user ON access_tokens(user_id);
"#;
