use serde::{de::IntoDeserializer, Deserialize, Deserializer, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::repo_types::{Meal, MealType};
use crate::validation::message;

fn validate_meal_type(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    value
        .parse::<MealType>()
        .map(|_| ())
        .map_err(|_| message("meal_type", "Not a valid choice."))
}

/// Body of `POST /meal/new` and `PUT /meal/:id`. Updates replace every field.
#[derive(Debug, Deserialize, Validate)]
pub struct MealForm {
    #[validate(
        length(min = 1, message = "This field is required."),
        custom(function = "validate_meal_type")
    )]
    #[serde(default)]
    pub meal_type: String,
    #[validate(
        required(message = "This field is required."),
        range(min = 0, message = "Number of rotis cannot be negative.")
    )]
    pub rotis: Option<i32>,
    pub sabjis: Option<String>,
    pub rice: Option<String>,
    pub special_dish: Option<String>,
    pub milk: Option<String>,
}

/// Validated meal content, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct MealFields {
    pub meal_type: MealType,
    pub rotis: i32,
    pub sabjis: String,
    pub rice: String,
    pub special_dish: String,
    pub milk: String,
}

impl MealForm {
    /// Only meaningful after `validate()` succeeded.
    pub fn into_fields(self) -> Option<MealFields> {
        Some(MealFields {
            meal_type: self.meal_type.parse().ok()?,
            rotis: self.rotis?,
            sabjis: self.sabjis.unwrap_or_default(),
            rice: self.rice.unwrap_or_default(),
            special_dish: self.special_dish.unwrap_or_default(),
            milk: self.milk.unwrap_or_default(),
        })
    }
}

/// A blank query parameter (`?date=`) counts as not given.
fn empty_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match Option::<String>::deserialize(de)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => {
            let value: serde::de::value::StringDeserializer<D::Error> =
                raw.to_string().into_deserializer();
            T::deserialize(value).map(Some)
        }
    }
}

/// Query string of `GET /meals/filter`.
#[derive(Debug, Default, Deserialize)]
pub struct MealFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date: Option<Date>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub start_date: Option<Date>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub end_date: Option<Date>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub meal_type: Option<MealType>,
}

impl MealFilter {
    /// The inclusive range, applied only when both ends are given.
    pub fn range(&self) -> Option<(Date, Date)> {
        Some((self.start_date?, self.end_date?))
    }
}

/// Flat JSON view of a meal; the chef is resolved to a username.
#[derive(Debug, Serialize)]
pub struct MealView {
    pub id: Uuid,
    pub date: Date,
    pub meal_type: MealType,
    pub rotis: i32,
    pub sabjis: String,
    pub rice: String,
    pub special_dish: String,
    pub milk: String,
    pub chef: String,
    pub chef_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Meal> for MealView {
    fn from(m: Meal) -> Self {
        Self {
            id: m.id,
            date: m.date,
            meal_type: m.meal_type,
            rotis: m.rotis,
            sabjis: m.sabjis,
            rice: m.rice,
            special_dish: m.special_dish,
            milk: m.milk,
            chef: m.chef,
            chef_id: m.user_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedMealResponse {
    pub message: String,
    pub id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, validation::parse_query};
    use time::macros::{date, datetime};

    fn errors_of(form: MealForm) -> crate::error::FieldErrors {
        match AppError::from(form.validate().unwrap_err()) {
            AppError::Validation(fields) => fields,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn valid_form_fills_missing_side_dishes() {
        let form: MealForm =
            serde_json::from_str(r#"{"meal_type":"Lunch","rotis":12,"sabjis":"aloo"}"#).unwrap();
        assert!(form.validate().is_ok());
        let fields = form.into_fields().expect("validated form converts");
        assert_eq!(fields.meal_type, MealType::Lunch);
        assert_eq!(fields.rotis, 12);
        assert_eq!(fields.sabjis, "aloo");
        assert_eq!(fields.rice, "");
        assert_eq!(fields.milk, "");
    }

    #[test]
    fn zero_rotis_is_allowed() {
        let form: MealForm = serde_json::from_str(r#"{"meal_type":"Dinner","rotis":0}"#).unwrap();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn meal_type_and_rotis_are_required() {
        let fields = errors_of(serde_json::from_str("{}").unwrap());
        assert_eq!(fields["meal_type"], vec!["This field is required."]);
        assert_eq!(fields["rotis"], vec!["This field is required."]);
    }

    #[test]
    fn unknown_meal_type_and_negative_rotis_are_rejected() {
        let fields =
            errors_of(serde_json::from_str(r#"{"meal_type":"Snack","rotis":-1}"#).unwrap());
        assert_eq!(fields["meal_type"], vec!["Not a valid choice."]);
        assert_eq!(fields["rotis"], vec!["Number of rotis cannot be negative."]);
    }

    #[test]
    fn filter_parses_dates_and_meal_type() {
        let f: MealFilter =
            parse_query("/meals/filter?start_date=2024-03-01&end_date=2024-03-07&meal_type=Lunch")
                .expect("valid query");
        assert_eq!(f.date, None);
        assert_eq!(f.range(), Some((date!(2024 - 03 - 01), date!(2024 - 03 - 07))));
        assert_eq!(f.meal_type, Some(MealType::Lunch));
    }

    #[test]
    fn filter_range_needs_both_bounds() {
        let f: MealFilter = parse_query("/meals/filter?start_date=2024-03-01").unwrap();
        assert_eq!(f.range(), None);
        assert_eq!(f.start_date, Some(date!(2024 - 03 - 01)));
    }

    #[test]
    fn blank_filter_parameters_are_ignored() {
        let f: MealFilter =
            parse_query("/meals/filter?date=&start_date=&end_date=&meal_type=Lunch").unwrap();
        assert_eq!(f.date, None);
        assert_eq!(f.range(), None);
        assert_eq!(f.meal_type, Some(MealType::Lunch));

        let f: MealFilter = parse_query("/meals/filter?date=2024-03-05&meal_type=").unwrap();
        assert_eq!(f.date, Some(date!(2024 - 03 - 05)));
        assert_eq!(f.meal_type, None);
    }

    #[test]
    fn filter_rejects_malformed_values() {
        let err = parse_query::<MealFilter>("/meals/filter?date=03/01/2024").unwrap_err();
        assert!(matches!(err, AppError::Validation(f) if f.contains_key("query")));

        let err = parse_query::<MealFilter>("/meals/filter?meal_type=Brunch").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn meal_view_is_flat() {
        let view = MealView::from(Meal {
            id: Uuid::nil(),
            date: date!(2024 - 03 - 05),
            meal_type: MealType::Breakfast,
            rotis: 20,
            sabjis: "bhindi".into(),
            rice: "jeera".into(),
            special_dish: String::new(),
            milk: "500ml".into(),
            user_id: Uuid::nil(),
            chef: "ravi".into(),
            created_at: datetime!(2024-03-05 06:30 UTC),
            updated_at: datetime!(2024-03-05 06:30 UTC),
        });
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["date"], "2024-03-05");
        assert_eq!(json["meal_type"], "Breakfast");
        assert_eq!(json["chef"], "ravi");
        assert_eq!(json["created_at"], "2024-03-05T06:30:00Z");
        assert!(json.as_object().unwrap().values().all(|v| !v.is_object()));
    }
}
