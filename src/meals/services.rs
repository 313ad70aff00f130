use time::{macros::time, Date, OffsetDateTime, Time, UtcOffset};

use super::repo_types::MealType;

const BREAKFAST_START: Time = time!(05:00);
const LUNCH_START: Time = time!(10:00);
const DINNER_START: Time = time!(15:00);

/// Serving slot for a wall-clock time: [05:00,10:00) breakfast, [10:00,15:00) lunch, else dinner.
pub fn slot_for_time(t: Time) -> MealType {
    if (BREAKFAST_START..LUNCH_START).contains(&t) {
        MealType::Breakfast
    } else if (LUNCH_START..DINNER_START).contains(&t) {
        MealType::Lunch
    } else {
        MealType::Dinner
    }
}

/// Current instant on the meal clock (UTC shifted by the configured offset).
pub fn meal_clock_now(offset: UtcOffset) -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(offset)
}

/// The date and slot whose meal is being served at `now`.
pub fn current_slot(now: OffsetDateTime) -> (Date, MealType) {
    (now.date(), slot_for_time(now.time()))
}
