use crate::schema::profiles;
use catalog::Profile;
use chrono::NaiveDateTime;

// To query data from the database
#[derive(Debug, Clone, Identifiable, Queryable)]
#[primary_key(user_id)]
#[table_name = "profiles"]
pub struct ProfileRow {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub created_at: NaiveDateTime,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
        }
    }
}
