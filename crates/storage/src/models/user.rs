use sqlx::FromRow;

/// Login and credentials are owned by the front end; only identity is read here.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub username: String,
    pub display_name: String,
}
