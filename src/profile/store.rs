//! Profile Storage
//! Mission: Persist one profile document per user in SQLite

use crate::db::Database;
use crate::error::ProfileError;
use crate::profile::models::{
    Education, Experience, Profile, ProfileOwner, ProfileRequest, ProfileView,
};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};
use uuid::Uuid;

const VIEW_SELECT: &str = "SELECT p.document, u.id, u.name, u.avatar
     FROM profiles p JOIN users u ON u.id = p.user_id";

pub struct ProfileStore {
    db: Database,
}

impl ProfileStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Profile owned by `user_id`, if any
    pub async fn find_by_user(&self, user_id: &Uuid) -> Result<Option<ProfileView>> {
        let conn = self.db.conn().lock().await;
        load_view(&conn, user_id)
    }

    /// Every profile, oldest first
    pub async fn list(&self) -> Result<Vec<ProfileView>> {
        let conn = self.db.conn().lock().await;
        let mut stmt = conn.prepare(&format!("{VIEW_SELECT} ORDER BY p.rowid"))?;

        let views = stmt
            .query_map([], view_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list profiles")?;

        Ok(views)
    }

    /// Create the caller's profile or update the existing one
    pub async fn upsert(
        &self,
        user_id: &Uuid,
        req: &ProfileRequest,
    ) -> Result<ProfileView, ProfileError> {
        let mut conn = self.db.conn().lock().await;
        let tx = conn.transaction().context("Failed to begin transaction")?;

        if !user_exists(&tx, user_id)? {
            return Err(ProfileError::UserNotFound);
        }

        let existing = load_document(&tx, user_id)?;
        let profile = match existing {
            Some(mut profile) => {
                profile.apply(req);
                debug!("Updating profile for user {}", user_id);
                profile
            }
            None => {
                info!("🆕 Creating profile for user {}", user_id);
                Profile::create(req, Utc::now().to_rfc3339())
            }
        };

        save_document(&tx, user_id, &profile)?;
        let view = load_view(&tx, user_id)?.context("Profile vanished after save")?;
        tx.commit().context("Failed to commit profile")?;

        Ok(view)
    }

    /// Prepend an experience entry
    pub async fn add_experience(
        &self,
        user_id: &Uuid,
        entry: Experience,
    ) -> Result<ProfileView, ProfileError> {
        self.mutate(user_id, move |profile| {
            profile.experience.insert(0, entry);
            Ok(())
        })
        .await
    }

    /// Remove an experience entry by id; unknown ids are `ExperienceNotFound`
    pub async fn remove_experience(
        &self,
        user_id: &Uuid,
        exp_id: &str,
    ) -> Result<ProfileView, ProfileError> {
        self.mutate(user_id, |profile| {
            if profile.remove_experience(exp_id) {
                Ok(())
            } else {
                Err(ProfileError::ExperienceNotFound)
            }
        })
        .await
    }

    /// Prepend an education entry
    pub async fn add_education(
        &self,
        user_id: &Uuid,
        entry: Education,
    ) -> Result<ProfileView, ProfileError> {
        self.mutate(user_id, move |profile| {
            profile.education.insert(0, entry);
            Ok(())
        })
        .await
    }

    /// Remove an education entry by id; unknown ids are `EducationNotFound`
    pub async fn remove_education(
        &self,
        user_id: &Uuid,
        edu_id: &str,
    ) -> Result<ProfileView, ProfileError> {
        self.mutate(user_id, |profile| {
            if profile.remove_education(edu_id) {
                Ok(())
            } else {
                Err(ProfileError::EducationNotFound)
            }
        })
        .await
    }

    /// Read-modify-write of one document under the connection lock
    async fn mutate<F>(&self, user_id: &Uuid, f: F) -> Result<ProfileView, ProfileError>
    where
        F: FnOnce(&mut Profile) -> Result<(), ProfileError>,
    {
        let mut conn = self.db.conn().lock().await;
        let tx = conn.transaction().context("Failed to begin transaction")?;

        let mut profile = load_document(&tx, user_id)?.ok_or(ProfileError::NoProfile)?;
        f(&mut profile)?;

        save_document(&tx, user_id, &profile)?;
        let view = load_view(&tx, user_id)?.ok_or(ProfileError::NoProfile)?;
        tx.commit().context("Failed to commit profile update")?;

        Ok(view)
    }
}

fn view_from_row(row: &Row<'_>) -> rusqlite::Result<ProfileView> {
    let document: String = row.get(0)?;
    let profile: Profile = serde_json::from_str(&document).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(ProfileView {
        user: ProfileOwner {
            id: row.get(1)?,
            name: row.get(2)?,
            avatar: row.get(3)?,
        },
        profile,
    })
}

fn user_exists(conn: &Connection, user_id: &Uuid) -> Result<bool> {
    conn.query_row(
        "SELECT 1 FROM users WHERE id = ?1",
        params![user_id.to_string()],
        |_| Ok(()),
    )
    .optional()
    .map(|row| row.is_some())
    .context("Failed to look up profile owner")
}

fn load_view(conn: &Connection, user_id: &Uuid) -> Result<Option<ProfileView>> {
    conn.query_row(
        &format!("{VIEW_SELECT} WHERE p.user_id = ?1"),
        params![user_id.to_string()],
        view_from_row,
    )
    .optional()
    .context("Failed to load profile")
}

fn load_document(conn: &Connection, user_id: &Uuid) -> Result<Option<Profile>> {
    let document: Option<String> = conn
        .query_row(
            "SELECT document FROM profiles WHERE user_id = ?1",
            params![user_id.to_string()],
            |row| row.get(0),
        )
        .optional()
        .context("Failed to load profile document")?;

    document
        .map(|d| serde_json::from_str(&d).context("Corrupt profile document"))
        .transpose()
}

fn save_document(conn: &Connection, user_id: &Uuid, profile: &Profile) -> Result<()> {
    let document = serde_json::to_string(profile).context("Failed to encode profile")?;
    conn.execute(
        "INSERT INTO profiles (id, user_id, document, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(user_id) DO UPDATE SET
            document = excluded.document,
            updated_at = excluded.updated_at",
        params![
            profile.id,
            user_id.to_string(),
            document,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("Failed to save profile")?;
    Ok(())
}
