use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::models::domain::level::{CefrLevel, UserRole};
use crate::models::domain::lifecycle::Lifecycle;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_REGEX is a valid regex pattern")
});

/// Input for [`User::new`]. Level and role arrive as raw strings and are checked here.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub cefr: String,
    pub role: String,
    pub time_spent_seconds: Option<i64>,
    pub timeline: i32,
    pub first_access: bool,
}

/// Profile changes applied atomically by [`User::apply`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub cefr: Option<String>,
    pub role: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    cefr: CefrLevel,
    role: UserRole,
    time_spent_seconds: i64,
    timeline: i32,
    first_access: bool,
    #[serde(flatten)]
    lifecycle: Lifecycle,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::models::domain::bson_dates"
    )]
    created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(data: NewUser) -> AppResult<Self> {
        if data.id.trim().is_empty() {
            return Err(AppError::validation("id", "must not be empty"));
        }
        if data.password_hash.is_empty() {
            return Err(AppError::validation("password", "hash must not be empty"));
        }

        let time_spent_seconds = data.time_spent_seconds.unwrap_or(0);
        if time_spent_seconds < 0 {
            return Err(AppError::validation("time_spent_seconds", "must not be negative"));
        }
        if data.timeline < 0 {
            return Err(AppError::validation("timeline", "must not be negative"));
        }

        Ok(User {
            id: data.id.trim().to_string(),
            name: validate_name(&data.name)?,
            email: validate_email(&data.email)?,
            password_hash: data.password_hash,
            cefr: data.cefr.parse()?,
            role: data.role.parse()?,
            time_spent_seconds,
            timeline: data.timeline,
            first_access: data.first_access,
            lifecycle: Lifecycle::Active,
            created_at: Some(Utc::now()),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn email(&self) -> &str {
        &self.email
    }
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
    pub fn cefr(&self) -> CefrLevel {
        self.cefr
    }
    pub fn role(&self) -> UserRole {
        self.role
    }
    pub fn time_spent_seconds(&self) -> i64 {
        self.time_spent_seconds
    }
    pub fn timeline(&self) -> i32 {
        self.timeline
    }
    pub fn first_access(&self) -> bool {
        self.first_access
    }
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// At least 8 characters with an uppercase letter, a lowercase letter, a digit
    /// and a non-alphanumeric character.
    pub fn is_strong_password(candidate: &str) -> bool {
        candidate.chars().count() >= 8
            && candidate.chars().any(|c| c.is_ascii_uppercase())
            && candidate.chars().any(|c| c.is_ascii_lowercase())
            && candidate.chars().any(|c| c.is_ascii_digit())
            && candidate.chars().any(|c| !c.is_ascii_alphanumeric())
    }

    pub fn with_name(mut self, name: &str) -> AppResult<Self> {
        self.name = validate_name(name)?;
        Ok(self)
    }

    pub fn with_email(mut self, email: &str) -> AppResult<Self> {
        self.email = validate_email(email)?;
        Ok(self)
    }

    pub fn with_cefr(mut self, cefr: &str) -> AppResult<Self> {
        self.cefr = cefr.parse()?;
        Ok(self)
    }

    pub fn with_role(mut self, role: &str) -> AppResult<Self> {
        self.role = role.parse()?;
        Ok(self)
    }

    /// Applies every field of `patch` or none of them.
    pub fn apply(&self, patch: &UserPatch) -> AppResult<Self> {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next = next.with_name(name)?;
        }
        if let Some(email) = &patch.email {
            next = next.with_email(email)?;
        }
        if let Some(cefr) = &patch.cefr {
            next = next.with_cefr(cefr)?;
        }
        if let Some(role) = &patch.role {
            next = next.with_role(role)?;
        }
        Ok(next)
    }

    pub fn set_password_hash(&mut self, password_hash: &str) -> AppResult<()> {
        if password_hash.is_empty() {
            return Err(AppError::validation("password", "hash must not be empty"));
        }
        self.password_hash = password_hash.to_string();
        Ok(())
    }

    pub fn add_study_time(&mut self, seconds: i64) -> AppResult<()> {
        if seconds <= 0 {
            return Err(AppError::InvalidDuration(seconds));
        }
        self.time_spent_seconds = self
            .time_spent_seconds
            .checked_add(seconds)
            .ok_or(AppError::InvalidDuration(seconds))?;
        Ok(())
    }

    /// First access only ever flips from true to false. Returns whether it changed.
    pub fn complete_first_access(&mut self) -> bool {
        let changed = self.first_access;
        self.first_access = false;
        changed
    }

    pub fn set_timeline(&mut self, timeline: i32) -> AppResult<()> {
        if timeline < 0 {
            return Err(AppError::validation("timeline", "must not be negative"));
        }
        self.timeline = timeline;
        Ok(())
    }

    pub fn into_deleted(mut self, at: DateTime<Utc>) -> Self {
        self.lifecycle = Lifecycle::Deleted { deleted_at: at };
        self
    }
}

fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("name", "must not be empty"));
    }
    Ok(name.to_string())
}

fn validate_email(email: &str) -> AppResult<String> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::validation("email", "must not be empty"));
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err(AppError::validation("email", "must be a valid email address"));
    }
    Ok(email.to_lowercase())
}

#[cfg(test)]
impl User {
    pub fn test_user(id: &str, email: &str) -> Self {
        User::new(NewUser {
            id: id.to_string(),
            name: "Test Student".to_string(),
            email: email.to_string(),
            password_hash: "hashed-secret".to_string(),
            cefr: "B1".to_string(),
            role: "student".to_string(),
            time_spent_seconds: None,
            timeline: 1,
            first_access: true,
        })
        .expect("test user should be valid")
    }
}
