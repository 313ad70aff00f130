use anyhow::Context;
use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use super::{
    dto::{MealFields, MealFilter},
    repo_types::{Meal, MealType},
};

const MEAL_COLUMNS: &str = r#"
    m.id, m.date, m.meal_type, m.rotis, m.sabjis, m.rice, m.special_dish, m.milk,
    m.user_id, u.username AS chef, m.created_at, m.updated_at
"#;

impl Meal {
    pub async fn create(
        db: &PgPool,
        chef_id: Uuid,
        date: Date,
        fields: &MealFields,
    ) -> anyhow::Result<Meal> {
        let sql = format!(
            r#"
            WITH m AS (
                INSERT INTO meals (date, meal_type, rotis, sabjis, rice, special_dish, milk, user_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
            )
            SELECT {MEAL_COLUMNS}
            FROM m JOIN users u ON u.id = m.user_id
            "#
        );
        sqlx::query_as::<_, Meal>(&sql)
            .bind(date)
            .bind(fields.meal_type)
            .bind(fields.rotis)
            .bind(&fields.sabjis)
            .bind(&fields.rice)
            .bind(&fields.special_dish)
            .bind(&fields.milk)
            .bind(chef_id)
            .fetch_one(db)
            .await
            .context("insert meal")
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Meal>> {
        let sql = format!(
            "SELECT {MEAL_COLUMNS} FROM meals m JOIN users u ON u.id = m.user_id WHERE m.id = $1"
        );
        sqlx::query_as::<_, Meal>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .context("find meal by id")
    }

    /// Chef of a meal, without loading the rest of it.
    pub async fn chef_of(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Uuid>> {
        let row: Option<(Uuid,)> = sqlx::query_as("SELECT user_id FROM meals WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
            .context("find meal chef")?;
        Ok(row.map(|(chef,)| chef))
    }

    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Meal>> {
        let sql = format!(
            r#"
            SELECT {MEAL_COLUMNS}
            FROM meals m JOIN users u ON u.id = m.user_id
            ORDER BY m.date DESC, m.created_at DESC
            "#
        );
        sqlx::query_as::<_, Meal>(&sql)
            .fetch_all(db)
            .await
            .context("list meals")
    }

    /// Latest meal created for `date` and `meal_type`; duplicates are allowed, last write wins.
    pub async fn find_for_slot(
        db: &PgPool,
        date: Date,
        meal_type: MealType,
    ) -> anyhow::Result<Option<Meal>> {
        let sql = format!(
            r#"
            SELECT {MEAL_COLUMNS}
            FROM meals m JOIN users u ON u.id = m.user_id
            WHERE m.date = $1 AND m.meal_type = $2
            ORDER BY m.created_at DESC
            LIMIT 1
            "#
        );
        sqlx::query_as::<_, Meal>(&sql)
            .bind(date)
            .bind(meal_type)
            .fetch_optional(db)
            .await
            .context("find meal for slot")
    }

    pub async fn list_filtered(db: &PgPool, filter: &MealFilter) -> anyhow::Result<Vec<Meal>> {
        let (start, end) = filter.range().unzip();
        let sql = format!(
            r#"
            SELECT {MEAL_COLUMNS}
            FROM meals m JOIN users u ON u.id = m.user_id
            WHERE ($1::date IS NULL OR m.date = $1)
              AND ($2::date IS NULL OR m.date BETWEEN $2 AND $3)
              AND ($4::meal_type IS NULL OR m.meal_type = $4)
            ORDER BY m.date DESC, m.created_at DESC
            "#
        );
        sqlx::query_as::<_, Meal>(&sql)
            .bind(filter.date)
            .bind(start)
            .bind(end)
            .bind(filter.meal_type)
            .fetch_all(db)
            .await
            .context("filter meals")
    }

    pub async fn update(db: &PgPool, id: Uuid, fields: &MealFields) -> anyhow::Result<Option<Meal>> {
        let sql = format!(
            r#"
            WITH m AS (
                UPDATE meals
                SET meal_type = $2, rotis = $3, sabjis = $4, rice = $5,
                    special_dish = $6, milk = $7, updated_at = now()
                WHERE id = $1
                RETURNING *
            )
            SELECT {MEAL_COLUMNS}
            FROM m JOIN users u ON u.id = m.user_id
            "#
        );
        sqlx::query_as::<_, Meal>(&sql)
            .bind(id)
            .bind(fields.meal_type)
            .bind(fields.rotis)
            .bind(&fields.sabjis)
            .bind(&fields.rice)
            .bind(&fields.special_dish)
            .bind(&fields.milk)
            .fetch_optional(db)
            .await
            .context("update meal")
    }

    /// Consumption records go with the meal (ON DELETE CASCADE).
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM meals WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("delete meal")?;
        Ok(res.rows_affected() > 0)
    }
}
