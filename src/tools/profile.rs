//! Profile MCP Tools
//!
//! Demo sign-in and profile preferences.

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::db::Database;
use crate::intake::translation::find_language;
use crate::models::{User, UserUpdate, DIETARY_RESTRICTIONS};

/// Response for sign_out
#[derive(Debug, Serialize)]
pub struct SignOutResponse {
    pub user_id: String,
    pub signed_out: bool,
    /// Scan history is kept until clear_user_data
    pub history_kept: bool,
}

/// Create a demo account
pub fn sign_in(db: &Database) -> Result<User, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = User::create_demo(&conn, Utc::now()).map_err(|e| format!("Failed to sign in: {}", e))?;
    info!(user_id = %user.id, "Signed in");
    Ok(user)
}

pub fn get_profile(db: &Database, user_id: &str) -> Result<Option<User>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    User::get_by_id(&conn, user_id).map_err(|e| format!("Failed to get profile: {}", e))
}

pub fn update_profile(db: &Database, user_id: &str, data: UserUpdate) -> Result<Option<User>, String> {
    if let Some(ref language) = data.language {
        find_language(language).map_err(|e| e.to_string())?;
    }
    if let Some(ref name) = data.name {
        if name.trim().is_empty() {
            return Err("Name must not be empty".to_string());
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    User::update(&conn, user_id, &data).map_err(|e| format!("Failed to update profile: {}", e))
}

pub fn toggle_dietary_restriction(db: &Database, user_id: &str, restriction: &str) -> Result<Option<User>, String> {
    if !DIETARY_RESTRICTIONS.contains(&restriction) {
        return Err(format!(
            "Unknown dietary restriction '{}'. Valid: {}",
            restriction,
            DIETARY_RESTRICTIONS.join(", ")
        ));
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    User::toggle_dietary_restriction(&conn, user_id, restriction)
        .map_err(|e| format!("Failed to update dietary restrictions: {}", e))
}

/// Remove the account; its scan history stays until cleared
pub fn sign_out(db: &Database, user_id: &str) -> Result<SignOutResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let signed_out = User::delete(&conn, user_id).map_err(|e| format!("Failed to sign out: {}", e))?;
    if signed_out {
        info!(user_id, "Signed out");
    }

    Ok(SignOutResponse {
        user_id: user_id.to_string(),
        signed_out,
        history_kept: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn test_db() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    #[test]
    fn test_sign_in_and_out() {
        let db = test_db();
        let user = sign_in(&db).unwrap();
        assert!(get_profile(&db, &user.id).unwrap().is_some());

        let response = sign_out(&db, &user.id).unwrap();
        assert!(response.signed_out);
        assert!(get_profile(&db, &user.id).unwrap().is_none());

        assert!(!sign_out(&db, &user.id).unwrap().signed_out);
    }

    #[test]
    fn test_repeated_sign_ins_get_distinct_ids() {
        let db = test_db();
        let mut ids = std::collections::HashSet::new();
        for _ in 0..50 {
            let user = sign_in(&db).unwrap();
            assert!(ids.insert(user.id));
        }
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_update_profile_validates_language() {
        let db = test_db();
        let user = sign_in(&db).unwrap();

        let bad = UserUpdate {
            language: Some("xx".to_string()),
            ..Default::default()
        };
        assert!(update_profile(&db, &user.id, bad).is_err());

        let good = UserUpdate {
            language: Some("fr".to_string()),
            notifications: Some(false),
            ..Default::default()
        };
        let updated = update_profile(&db, &user.id, good).unwrap().unwrap();
        assert_eq!(updated.preferences.language, "fr");
        assert!(!updated.preferences.notifications);
    }

    #[test]
    fn test_toggle_rejects_unknown_restriction() {
        let db = test_db();
        let user = sign_in(&db).unwrap();

        let err = toggle_dietary_restriction(&db, &user.id, "Carnivore").unwrap_err();
        assert!(err.contains("Gluten-Free"));

        let updated = toggle_dietary_restriction(&db, &user.id, "Low-Sodium").unwrap().unwrap();
        assert_eq!(updated.preferences.dietary_restrictions, vec!["Low-Sodium"]);
    }
}
