use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require_email, require_text};
use crate::schema::users;

pub const DEFAULT_ROLE: &str = "admin";

/// Administrator account. Reviews listings and confirms reservations.
#[derive(Debug, Clone, Serialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserInput {
    pub full_name: String,
    pub email: String,
    pub role: Option<String>,
}

impl UserInput {
    pub fn validate(self) -> Result<UserInput, String> {
        let role = match self.role {
            Some(role) => require_text("role", &role)?.to_lowercase(),
            None => DEFAULT_ROLE.to_string(),
        };
        Ok(UserInput {
            full_name: require_text("full_name", &self.full_name)?,
            email: require_email(&self.email)?,
            role: Some(role),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_defaults_to_admin() {
        let input = UserInput {
            full_name: "Sam".into(),
            email: "sam@example.com".into(),
            role: None,
        }
        .validate()
        .unwrap();
        assert_eq!(input.role.as_deref(), Some(DEFAULT_ROLE));
    }
}
