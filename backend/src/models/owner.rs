use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{clean_optional, require_email, require_text};
use crate::schema::owners;

#[derive(Debug, Clone, Serialize, Queryable, Selectable)]
#[diesel(table_name = owners)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Owner {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = owners)]
pub struct NewOwner {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = owners)]
#[diesel(treat_none_as_null = true)]
pub struct OwnerChangeset {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub updated_at: NaiveDateTime,
}

/// Body of create and update requests for an owner.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnerInput {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl OwnerInput {
    pub fn validate(self) -> Result<OwnerInput, String> {
        Ok(OwnerInput {
            full_name: require_text("full_name", &self.full_name)?,
            email: require_email(&self.email)?,
            phone: clean_optional(self.phone),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_owner_input() {
        let input = OwnerInput {
            full_name: "  Ana Lopez ".into(),
            email: "Ana@Example.org".into(),
            phone: Some(" ".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(input.full_name, "Ana Lopez");
        assert_eq!(input.email, "ana@example.org");
        assert_eq!(input.phone, None);
    }

    #[test]
    fn rejects_missing_name() {
        let err = OwnerInput {
            full_name: " ".into(),
            email: "ana@example.org".into(),
            phone: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, "full_name is required");
    }
}
