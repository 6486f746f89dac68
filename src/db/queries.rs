pub const CREATE_LOCATION_POINTS: &str = r#"
CREATE TABLE IF NOT EXISTS location_points (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    timestamp_ms INTEGER NOT NULL
);
"#;

pub const CREATE_LOCATION_POINTS_TIMESTAMP_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_location_points_timestamp ON location_points (timestamp_ms);
"#;

pub const INSERT_POINT: &str = r#"
INSERT INTO location_points (latitude, longitude, timestamp_ms)
VALUES ($1, $2, $3);
"#;

pub const DELETE_ALL_POINTS: &str = r#"
DELETE FROM location_points;
"#;

pub const SELECT_ALL_POINTS_ORDERED: &str = r#"
SELECT id, latitude, longitude, timestamp_ms FROM location_points ORDER BY timestamp_ms ASC, id ASC;
"#;

pub const COUNT_POINTS: &str = r#"
SELECT COUNT(*) FROM location_points;
"#;
