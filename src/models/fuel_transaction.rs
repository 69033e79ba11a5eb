use chrono::{DateTime, FixedOffset, Timelike, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Hour (station local time) at which the morning shift starts.
pub const MORNING_START_HOUR: u32 = 6;
/// Hour (station local time) at which the night shift starts.
pub const NIGHT_START_HOUR: u32 = 18;

/// Work shift a sale is attributed to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Shift {
    #[sea_orm(string_value = "morning")]
    Morning,
    #[sea_orm(string_value = "night")]
    Night,
}

impl Shift {
    pub fn from_local_hour(hour: u32) -> Self {
        if (MORNING_START_HOUR..NIGHT_START_HOUR).contains(&hour) {
            Shift::Morning
        } else {
            Shift::Night
        }
    }

    /// Shift that contains `at` once shifted into the station's timezone.
    pub fn containing(at: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self::from_local_hour(at.with_timezone(&offset).hour())
    }
}

/// The `fuel_transactions` table.
///
/// `price_per_liter` and `fuel_type` are copied from the pump when the row is
/// created so later price changes never rewrite history.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "fuel_transactions")]
#[serde(rename_all = "camelCase")]
#[schema(as = FuelTransaction)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub pump_id: Uuid,
    /// Per-pump insertion counter; the highest value is the pump's most recent sale.
    pub sequence: i64,
    pub previous_index: i64,
    pub current_index: i64,
    pub liters_dispensed: f64,
    pub price_per_liter: f64,
    pub revenue: f64,
    pub fuel_type: String,
    pub shift: Shift,
    pub payment_method: String,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pump::Entity",
        from = "Column::PumpId",
        to = "super::pump::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Pump,
}

impl Related<super::pump::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pump.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case(0, Shift::Night)]
    #[case(5, Shift::Night)]
    #[case(6, Shift::Morning)]
    #[case(12, Shift::Morning)]
    #[case(17, Shift::Morning)]
    #[case(18, Shift::Night)]
    #[case(23, Shift::Night)]
    fn shift_boundaries(#[case] hour: u32, #[case] expected: Shift) {
        assert_eq!(Shift::from_local_hour(hour), expected);
    }

    #[test]
    fn shift_uses_station_offset() {
        // 17:30 UTC is 18:30 at UTC+1.
        let at = Utc.with_ymd_and_hms(2025, 4, 1, 17, 30, 0).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        let tunis = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(Shift::containing(at, utc), Shift::Morning);
        assert_eq!(Shift::containing(at, tunis), Shift::Night);
    }
}
