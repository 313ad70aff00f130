use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::UserMeal;

impl UserMeal {
    /// Inserts the record unless one already exists for (user, meal).
    ///
    /// The composite primary key arbitrates concurrent inserts, so `None` means
    /// another request got there first.
    pub async fn insert_once(
        db: &PgPool,
        user_id: Uuid,
        meal_id: Uuid,
        rotis: i32,
    ) -> anyhow::Result<Option<UserMeal>> {
        sqlx::query_as::<_, UserMeal>(
            r#"
            INSERT INTO user_meals (user_id, meal_id, rotis)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, meal_id) DO NOTHING
            RETURNING user_id, meal_id, rotis
            "#,
        )
        .bind(user_id)
        .bind(meal_id)
        .bind(rotis)
        .fetch_optional(db)
        .await
        .context("insert user meal")
    }

    pub async fn update_rotis(
        db: &PgPool,
        user_id: Uuid,
        meal_id: Uuid,
        rotis: i32,
    ) -> anyhow::Result<Option<UserMeal>> {
        sqlx::query_as::<_, UserMeal>(
            r#"
            UPDATE user_meals
            SET rotis = $3, updated_at = now()
            WHERE user_id = $1 AND meal_id = $2
            RETURNING user_id, meal_id, rotis
            "#,
        )
        .bind(user_id)
        .bind(meal_id)
        .bind(rotis)
        .fetch_optional(db)
        .await
        .context("update user meal")
    }

    pub async fn total_rotis(db: &PgPool, meal_id: Uuid) -> anyhow::Result<i64> {
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(rotis), 0)::BIGINT FROM user_meals WHERE meal_id = $1",
        )
        .bind(meal_id)
        .fetch_one(db)
        .await
        .context("sum rotis for meal")?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn user(db: &PgPool, name: &str) -> Uuid {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, 'x') RETURNING id",
        )
        .bind(name)
        .bind(format!("{name}@example.com"))
        .fetch_one(db)
        .await
        .unwrap();
        id
    }

    async fn meal(db: &PgPool, chef: Uuid) -> Uuid {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO meals (date, meal_type, rotis, user_id) VALUES (CURRENT_DATE, 'Lunch', 40, $1) RETURNING id",
        )
        .bind(chef)
        .fetch_one(db)
        .await
        .unwrap();
        id
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn second_insert_for_same_pair_is_refused(db: PgPool) {
        let chef = user(&db, "ravi").await;
        let eater = user(&db, "asha").await;
        let meal_id = meal(&db, chef).await;

        let (a, b) = tokio::join!(
            UserMeal::insert_once(&db, eater, meal_id, 3),
            UserMeal::insert_once(&db, eater, meal_id, 4),
        );
        let inserted = [a.unwrap(), b.unwrap()];
        assert_eq!(inserted.iter().filter(|r| r.is_some()).count(), 1);

        assert!(UserMeal::insert_once(&db, eater, meal_id, 5)
            .await
            .unwrap()
            .is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn total_is_the_exact_sum(db: PgPool) {
        let chef = user(&db, "ravi").await;
        let meal_id = meal(&db, chef).await;
        assert_eq!(UserMeal::total_rotis(&db, meal_id).await.unwrap(), 0);

        for (name, rotis) in [("asha", 3), ("neel", 5), ("tara", 0)] {
            let id = user(&db, name).await;
            UserMeal::insert_once(&db, id, meal_id, rotis).await.unwrap();
        }
        assert_eq!(UserMeal::total_rotis(&db, meal_id).await.unwrap(), 8);

        let asha: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE username = 'asha'")
            .fetch_one(&db)
            .await
            .unwrap();
        let updated = UserMeal::update_rotis(&db, asha.0, meal_id, 6).await.unwrap();
        assert_eq!(updated.map(|u| u.rotis), Some(6));
        assert_eq!(UserMeal::total_rotis(&db, meal_id).await.unwrap(), 11);
    }
}
