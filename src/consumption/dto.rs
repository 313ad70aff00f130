use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST`/`PUT /user_meal/:meal_id`; a missing count means zero.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RotisForm {
    #[validate(range(min = 0, message = "Number of rotis cannot be negative."))]
    #[serde(default)]
    pub rotis: i32,
}

#[derive(Debug, Serialize)]
pub struct TotalRotisResponse {
    pub total_rotis: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rotis_defaults_to_zero() {
        let form: RotisForm = serde_json::from_str("{}").unwrap();
        assert_eq!(form.rotis, 0);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn negative_rotis_are_rejected() {
        let form: RotisForm = serde_json::from_str(r#"{"rotis":-2}"#).unwrap();
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("rotis"));
    }
}
