use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Serving slot of a meal; stored as the Postgres enum `meal_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "meal_type")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 3] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];

    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MealType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or(())
    }
}

/// Meal row joined with its chef's username.
#[derive(Debug, Clone, FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub date: Date,
    pub meal_type: MealType,
    pub rotis: i32,
    pub sabjis: String,
    pub rice: String,
    pub special_dish: String,
    pub milk: String,
    pub user_id: Uuid,
    pub chef: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meal_type_parses_exact_names_only() {
        assert_eq!("Lunch".parse::<MealType>(), Ok(MealType::Lunch));
        assert!("lunch".parse::<MealType>().is_err());
        assert!("Snack".parse::<MealType>().is_err());
        for t in MealType::ALL {
            assert_eq!(t.to_string().parse::<MealType>(), Ok(t));
        }
    }
}
