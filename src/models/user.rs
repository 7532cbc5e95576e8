//! User model
//!
//! A signed-in profile with preferences and cached scan stats.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{DbError, DbResult};

use super::scan::format_timestamp;

pub const DEMO_USER_NAME: &str = "Demo User";
pub const DEMO_USER_EMAIL: &str = "demo@nutriscan.com";

/// Restrictions a profile can toggle
pub const DIETARY_RESTRICTIONS: &[&str] = &[
    "Gluten-Free",
    "Dairy-Free",
    "Vegan",
    "Vegetarian",
    "Keto",
    "Low-Sodium",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub language: String,
    pub notifications: bool,
    pub public_profile: bool,
    pub dietary_restrictions: Vec<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            notifications: true,
            public_profile: false,
            dietary_restrictions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_scans: i64,
    pub avg_score: i64,
    /// Consecutive days with at least one scan, ending at the latest scan day
    pub streak: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub join_date: String,
    pub preferences: Preferences,
    pub stats: UserStats,
    pub created_at: String,
    pub updated_at: String,
}

/// Profile fields to change; `None` leaves a field as is
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub language: Option<String>,
    pub notifications: Option<bool>,
    pub public_profile: Option<bool>,
}

impl User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let restrictions_json: String = row.get("dietary_restrictions")?;
        let dietary_restrictions: Vec<String> = serde_json::from_str(&restrictions_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            join_date: row.get("join_date")?,
            preferences: Preferences {
                language: row.get("language")?,
                notifications: row.get("notifications")?,
                public_profile: row.get("public_profile")?,
                dietary_restrictions,
            },
            stats: UserStats {
                total_scans: row.get("total_scans")?,
                avg_score: row.get("avg_score")?,
                streak: row.get("streak")?,
            },
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Create the demo account, id `user_<millis>_<9 hex>`
    pub fn create_demo(conn: &Connection, now: DateTime<Utc>) -> DbResult<Self> {
        let suffix = Uuid::new_v4().simple().to_string();
        let id = format!("user_{}_{}", now.timestamp_millis(), &suffix[..9]);
        let prefs = Preferences::default();

        conn.execute(
            r#"
            INSERT INTO users (id, name, email, join_date, language, notifications, public_profile, dietary_restrictions)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, '[]')
            "#,
            params![
                id,
                DEMO_USER_NAME,
                DEMO_USER_EMAIL,
                format_timestamp(now),
                prefs.language,
                prefs.notifications,
                prefs.public_profile,
            ],
        )?;

        Self::get_by_id(conn, &id)?.ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn update(conn: &Connection, id: &str, data: &UserUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        macro_rules! add_update {
            ($field:ident, $col:expr) => {
                if let Some(ref val) = data.$field {
                    updates.push(format!("{} = ?{}", $col, params_vec.len() + 1));
                    params_vec.push(Box::new(val.clone()));
                }
            };
        }

        add_update!(name, "name");
        add_update!(email, "email");
        add_update!(language, "language");
        add_update!(notifications, "notifications");
        add_update!(public_profile, "public_profile");

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE users SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id.to_string()));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Add the restriction if absent, remove it if present
    pub fn toggle_dietary_restriction(conn: &Connection, id: &str, restriction: &str) -> DbResult<Option<Self>> {
        let Some(user) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };

        let mut restrictions = user.preferences.dietary_restrictions;
        if let Some(pos) = restrictions.iter().position(|r| r == restriction) {
            restrictions.remove(pos);
        } else {
            restrictions.push(restriction.to_string());
        }

        conn.execute(
            "UPDATE users SET dietary_restrictions = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![serde_json::to_string(&restrictions)?, id],
        )?;

        Self::get_by_id(conn, id)
    }

    /// Delete the user row. Returns false if it did not exist.
    pub fn delete(conn: &Connection, id: &str) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Recalculate cached stats from the stored scan history
    pub fn refresh_stats(conn: &Connection, id: &str) -> DbResult<UserStats> {
        let (total_scans, avg): (i64, Option<f64>) = conn.query_row(
            "SELECT COUNT(*), AVG(overall_score) FROM scans WHERE user_id = ?1",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let mut stmt = conn.prepare(
            "SELECT DISTINCT substr(created_at, 1, 10) AS day FROM scans WHERE user_id = ?1 ORDER BY day DESC",
        )?;
        let days = stmt
            .query_map([id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let days: Vec<NaiveDate> = days
            .iter()
            .filter_map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .collect();

        let stats = UserStats {
            total_scans,
            avg_score: avg.map(|a| a.round() as i64).unwrap_or(0),
            streak: scan_streak(&days),
        };

        conn.execute(
            r#"
            UPDATE users SET
                total_scans = ?1,
                avg_score = ?2,
                streak = ?3,
                updated_at = datetime('now')
            WHERE id = ?4
            "#,
            params![stats.total_scans, stats.avg_score, stats.streak, id],
        )?;

        Ok(stats)
    }
}

/// Length of the run of consecutive days starting at the first entry.
///
/// `days` must be distinct and sorted newest first.
pub fn scan_streak(days: &[NaiveDate]) -> i64 {
    let Some(first) = days.first() else {
        return 0;
    };

    let mut streak = 1;
    let mut expected = *first;
    for day in &days[1..] {
        match expected.pred_opt() {
            Some(prev) if prev == *day => {
                streak += 1;
                expected = prev;
            }
            _ => break,
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use chrono::TimeZone;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn demo(conn: &Connection) -> User {
        let now = Utc.with_ymd_and_hms(2026, 5, 10, 9, 30, 0).unwrap();
        User::create_demo(conn, now).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_create_demo_user() {
        let conn = setup();
        let user = demo(&conn);

        assert!(user.id.starts_with("user_"));
        assert_eq!(user.name, DEMO_USER_NAME);
        assert_eq!(user.email, DEMO_USER_EMAIL);
        assert_eq!(user.preferences, Preferences::default());
        assert_eq!(user.stats, UserStats::default());
    }

    #[test]
    fn test_update_profile_partial() {
        let conn = setup();
        let user = demo(&conn);

        let update = UserUpdate {
            name: Some("Ana".to_string()),
            language: Some("es".to_string()),
            public_profile: Some(true),
            ..Default::default()
        };
        let updated = User::update(&conn, &user.id, &update).unwrap().unwrap();

        assert_eq!(updated.name, "Ana");
        assert_eq!(updated.email, DEMO_USER_EMAIL);
        assert_eq!(updated.preferences.language, "es");
        assert!(updated.preferences.public_profile);
        assert!(updated.preferences.notifications);

        assert!(User::update(&conn, "user_0", &update).unwrap().is_none());
    }

    #[test]
    fn test_toggle_dietary_restriction() {
        let conn = setup();
        let user = demo(&conn);

        let on = User::toggle_dietary_restriction(&conn, &user.id, "Vegan").unwrap().unwrap();
        assert_eq!(on.preferences.dietary_restrictions, vec!["Vegan"]);

        User::toggle_dietary_restriction(&conn, &user.id, "Keto").unwrap();
        let off = User::toggle_dietary_restriction(&conn, &user.id, "Vegan").unwrap().unwrap();
        assert_eq!(off.preferences.dietary_restrictions, vec!["Keto"]);
    }

    #[test]
    fn test_delete_user() {
        let conn = setup();
        let user = demo(&conn);

        assert!(User::delete(&conn, &user.id).unwrap());
        assert!(!User::delete(&conn, &user.id).unwrap());
        assert!(User::get_by_id(&conn, &user.id).unwrap().is_none());
    }

    #[test]
    fn test_scan_streak() {
        assert_eq!(scan_streak(&[]), 0);
        assert_eq!(scan_streak(&[day(2026, 5, 10)]), 1);
        assert_eq!(
            scan_streak(&[day(2026, 3, 1), day(2026, 2, 28), day(2026, 2, 27), day(2026, 2, 20)]),
            3
        );
        assert_eq!(scan_streak(&[day(2026, 5, 10), day(2026, 5, 8)]), 1);
    }

    #[test]
    fn test_refresh_stats_without_scans() {
        let conn = setup();
        let user = demo(&conn);

        let stats = User::refresh_stats(&conn, &user.id).unwrap();
        assert_eq!(stats, UserStats::default());
    }
}
