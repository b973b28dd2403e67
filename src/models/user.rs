use sqlx::FromRow;

/// Row of the externally owned `users` table. Only the columns the
/// registration gate reads are mapped.
#[derive(Debug, FromRow)]
pub struct User {
    pub rut: String,
    pub is_active: bool,
}
