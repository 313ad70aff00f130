use sqlx::FromRow;
use uuid::Uuid;

/// How many rotis one user ate from one meal; keyed by (user_id, meal_id).
#[derive(Debug, Clone, FromRow)]
pub struct UserMeal {
    pub user_id: Uuid,
    pub meal_id: Uuid,
    pub rotis: i32,
}
