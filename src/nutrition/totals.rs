use std::ops::AddAssign;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::value::{parse_nutrient, round_half_up, Numeric};

/// Nutrient amounts carried by a menu item. Every field is optional and may
/// be a bare number or a unit-suffixed string. `fat`, `totalCarbs` and
/// `carbs` are spellings some clients use for the canonical fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_fat: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturated_fat: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trans_fat: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cholesterol: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_carb: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_carbs: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_fiber: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugars: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<Numeric>,
}

impl NutrientFields {
    fn fat_value(&self) -> Option<&Numeric> {
        self.total_fat.as_ref().or(self.fat.as_ref())
    }

    fn carb_value(&self) -> Option<&Numeric> {
        self.total_carb
            .as_ref()
            .or(self.total_carbs.as_ref())
            .or(self.carbs.as_ref())
    }
}

/// One line of a meal: a menu item with an optional quantity multiplier.
///
/// Older clients nest the nutrients under `nutrition`; when that object is
/// present it wins over the top-level fields. Fields this type does not know
/// about (recipe ids, names, serving sizes) survive a round trip in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<NutrientFields>,
    #[serde(flatten)]
    pub nutrients: NutrientFields,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LineItem {
    /// Quantity multiplier; missing, zero or unparseable means one serving.
    pub fn multiplier(&self) -> f64 {
        self.quantity
            .as_ref()
            .and_then(Numeric::leading)
            .filter(|q| *q != 0.0)
            .unwrap_or(1.0)
    }

    fn fields(&self) -> &NutrientFields {
        self.nutrition.as_ref().unwrap_or(&self.nutrients)
    }
}

/// Summed nutrient amounts, unrounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientTotals {
    pub calories: f64,
    pub total_fat: f64,
    pub saturated_fat: f64,
    pub trans_fat: f64,
    pub cholesterol: f64,
    pub sodium: f64,
    pub total_carb: f64,
    pub dietary_fiber: f64,
    pub sugars: f64,
    pub protein: f64,
}

impl NutrientTotals {
    pub fn aggregate<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a LineItem>,
    {
        let mut totals = Self::default();
        for item in items {
            totals.add_item(item);
        }
        totals
    }

    pub fn add_item(&mut self, item: &LineItem) {
        let qty = item.multiplier();
        let f = item.fields();
        self.calories += parse_nutrient(f.calories.as_ref()) * qty;
        self.total_fat += parse_nutrient(f.fat_value()) * qty;
        self.saturated_fat += parse_nutrient(f.saturated_fat.as_ref()) * qty;
        self.trans_fat += parse_nutrient(f.trans_fat.as_ref()) * qty;
        self.cholesterol += parse_nutrient(f.cholesterol.as_ref()) * qty;
        self.sodium += parse_nutrient(f.sodium.as_ref()) * qty;
        self.total_carb += parse_nutrient(f.carb_value()) * qty;
        self.dietary_fiber += parse_nutrient(f.dietary_fiber.as_ref()) * qty;
        self.sugars += parse_nutrient(f.sugars.as_ref()) * qty;
        self.protein += parse_nutrient(f.protein.as_ref()) * qty;
    }

    /// Value for a nutrition-plan metric key. Plan keys differ from the item
    /// field names for carbohydrates and fiber; unknown keys read as zero.
    pub fn metric(&self, key: &str) -> f64 {
        match key {
            "calories" => self.calories,
            "protein" => self.protein,
            "totalFat" => self.total_fat,
            "saturatedFat" => self.saturated_fat,
            "transFat" => self.trans_fat,
            "cholesterol" => self.cholesterol,
            "totalCarbs" => self.total_carb,
            "fiber" => self.dietary_fiber,
            "sugars" => self.sugars,
            "sodium" => self.sodium,
            _ => 0.0,
        }
    }

    pub fn formatted(&self) -> FormattedTotals {
        FormattedTotals {
            calories: round_half_up(self.calories) as i64,
            total_fat: grams(self.total_fat),
            saturated_fat: grams(self.saturated_fat),
            trans_fat: grams(self.trans_fat),
            cholesterol: milligrams(self.cholesterol),
            sodium: milligrams(self.sodium),
            total_carb: grams(self.total_carb),
            dietary_fiber: grams(self.dietary_fiber),
            sugars: grams(self.sugars),
            protein: grams(self.protein),
        }
    }
}

impl AddAssign for NutrientTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.calories += rhs.calories;
        self.total_fat += rhs.total_fat;
        self.saturated_fat += rhs.saturated_fat;
        self.trans_fat += rhs.trans_fat;
        self.cholesterol += rhs.cholesterol;
        self.sodium += rhs.sodium;
        self.total_carb += rhs.total_carb;
        self.dietary_fiber += rhs.dietary_fiber;
        self.sugars += rhs.sugars;
        self.protein += rhs.protein;
    }
}

/// Totals as stored on a meal log and returned to clients: calories as an
/// integer, everything else with one decimal and a unit suffix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedTotals {
    pub calories: i64,
    pub total_fat: String,
    pub saturated_fat: String,
    pub trans_fat: String,
    pub cholesterol: String,
    pub sodium: String,
    pub total_carb: String,
    pub dietary_fiber: String,
    pub sugars: String,
    pub protein: String,
}

impl Default for FormattedTotals {
    fn default() -> Self {
        NutrientTotals::default().formatted()
    }
}

/// Aggregates a list of items into their formatted totals.
pub fn aggregate(items: &[LineItem]) -> FormattedTotals {
    NutrientTotals::aggregate(items).formatted()
}

/// One decimal place, ties rounded up on the exact binary value: 2.25 gives
/// "2.3" while 0.15 (stored just below the tie) gives "0.1".
fn one_decimal(v: f64) -> String {
    let exact = Decimal::from_f64_retain(v).unwrap_or_default();
    let rounded = exact.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.1}")
}

fn grams(v: f64) -> String {
    format!("{}g", one_decimal(v))
}

fn milligrams(v: f64) -> String {
    format!("{}mg", one_decimal(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items(value: Value) -> Vec<LineItem> {
        serde_json::from_value(value).expect("valid items")
    }

    #[test]
    fn decimal_ties_round_up() {
        let half = aggregate(&items(json!([{ "protein": "4.5g", "quantity": 0.5 }])));
        assert_eq!(half.protein, "2.3g");

        let quarter = aggregate(&items(json!([{ "protein": "0.25g", "sodium": "0.25mg" }])));
        assert_eq!(quarter.protein, "0.3g");
        assert_eq!(quarter.sodium, "0.3mg");

        let below_tie = aggregate(&items(json!([{ "sugars": "0.15g" }])));
        assert_eq!(below_tie.sugars, "0.1g");
    }

    #[test]
    fn quantity_multiplies_every_field() {
        let totals = aggregate(&items(json!([
            { "calories": 100, "protein": "10g", "quantity": 2 }
        ])));
        assert_eq!(totals.calories, 200);
        assert_eq!(totals.protein, "20.0g");
        assert_eq!(totals.total_fat, "0.0g");
        assert_eq!(totals.saturated_fat, "0.0g");
        assert_eq!(totals.trans_fat, "0.0g");
        assert_eq!(totals.cholesterol, "0.0mg");
        assert_eq!(totals.sodium, "0.0mg");
        assert_eq!(totals.total_carb, "0.0g");
        assert_eq!(totals.dietary_fiber, "0.0g");
        assert_eq!(totals.sugars, "0.0g");
    }

    #[test]
    fn missing_quantity_equals_explicit_single_serving() {
        let implicit = items(json!([
            { "calories": "250", "totalFat": "9.5g", "sodium": "410mg" },
            { "calories": 120, "protein": "3g", "sugars": "12g" }
        ]));
        let explicit: Vec<LineItem> = implicit
            .iter()
            .cloned()
            .map(|mut item| {
                item.quantity = Some(Numeric::Number(1.0));
                item
            })
            .collect();
        assert_eq!(aggregate(&implicit), aggregate(&explicit));
    }

    #[test]
    fn zero_quantity_counts_as_one() {
        let totals = aggregate(&items(json!([{ "calories": 80, "quantity": 0 }])));
        assert_eq!(totals.calories, 80);
    }

    #[test]
    fn nested_nutrition_wins_over_top_level() {
        let totals = aggregate(&items(json!([
            { "calories": 999, "nutrition": { "calories": "150", "fat": "5g", "carbs": "20g" } }
        ])));
        assert_eq!(totals.calories, 150);
        assert_eq!(totals.total_fat, "5.0g");
        assert_eq!(totals.total_carb, "20.0g");
    }

    #[test]
    fn alternate_spellings_feed_canonical_fields() {
        let totals = NutrientTotals::aggregate(&items(json!([
            { "totalCarbs": "30g", "dietaryFiber": "4g" }
        ])));
        assert_eq!(totals.metric("totalCarbs"), 30.0);
        assert_eq!(totals.metric("fiber"), 4.0);
        assert_eq!(totals.metric("caloriesFromFat"), 0.0);
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let parsed = items(json!([{ "recipeId": "abc", "recipeName": "Oatmeal", "calories": 150 }]));
        let back = serde_json::to_value(&parsed).unwrap();
        assert_eq!(back[0]["recipeId"], "abc");
        assert_eq!(back[0]["recipeName"], "Oatmeal");
        assert_eq!(back[0]["calories"], 150.0);
    }

    #[test]
    fn calories_round_to_integer() {
        let totals = aggregate(&items(json!([{ "calories": "99.5" }])));
        assert_eq!(totals.calories, 100);
    }

    #[test]
    fn empty_list_is_all_zero() {
        assert_eq!(aggregate(&[]), FormattedTotals::default());
    }
}
