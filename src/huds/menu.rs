use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMenu {
    pub category_number: Value,
    pub category_name: Value,
    pub recipes: Vec<Value>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealMenu {
    pub meal_number: Value,
    pub meal_name: Value,
    pub categories: Vec<CategoryMenu>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationMenu {
    pub location_number: Value,
    pub location_name: Value,
    pub meals: Vec<MealMenu>,
}

fn field(recipe: &Value, key: &str) -> Value {
    recipe.get(key).cloned().unwrap_or(Value::Null)
}

/// Nests a flat recipe list by location, meal and menu category. Groups keep
/// the order in which they first appear in the input.
pub fn group_menu(recipes: Vec<Value>) -> Vec<LocationMenu> {
    let mut locations: Vec<LocationMenu> = Vec::new();

    for recipe in recipes {
        let loc_num = field(&recipe, "Location_Number");
        let meal_num = field(&recipe, "Meal_Number");
        let cat_num = field(&recipe, "Menu_Category_Number");

        let li = match locations.iter().position(|l| l.location_number == loc_num) {
            Some(i) => i,
            None => {
                locations.push(LocationMenu {
                    location_number: loc_num,
                    location_name: field(&recipe, "Location_Name"),
                    meals: Vec::new(),
                });
                locations.len() - 1
            }
        };
        let meals = &mut locations[li].meals;

        let mi = match meals.iter().position(|m| m.meal_number == meal_num) {
            Some(i) => i,
            None => {
                meals.push(MealMenu {
                    meal_number: meal_num,
                    meal_name: field(&recipe, "Meal_Name"),
                    categories: Vec::new(),
                });
                meals.len() - 1
            }
        };
        let categories = &mut meals[mi].categories;

        let ci = match categories.iter().position(|c| c.category_number == cat_num) {
            Some(i) => i,
            None => {
                categories.push(CategoryMenu {
                    category_number: cat_num,
                    category_name: field(&recipe, "Menu_Category_Name"),
                    recipes: Vec::new(),
                });
                categories.len() - 1
            }
        };
        categories[ci].recipes.push(recipe);
    }

    locations
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recipe(loc: &str, meal: i64, cat: i64, name: &str) -> Value {
        let meal_name = if meal == 1 { "Breakfast" } else { "Lunch" };
        json!({
            "Location_Number": loc,
            "Location_Name": format!("Hall {loc}"),
            "Meal_Number": meal,
            "Meal_Name": meal_name,
            "Menu_Category_Number": cat,
            "Menu_Category_Name": format!("Cat {cat}"),
            "Recipe_Print_As_Name": name,
        })
    }

    #[test]
    fn groups_in_first_seen_order() {
        let menu = group_menu(vec![
            recipe("30", 2, 7, "Soup"),
            recipe("05", 1, 3, "Eggs"),
            recipe("30", 1, 3, "Oatmeal"),
            recipe("30", 2, 7, "Bread"),
            recipe("30", 2, 1, "Salad"),
        ]);

        assert_eq!(menu.len(), 2);
        assert_eq!(menu[0].location_number, json!("30"));
        assert_eq!(menu[1].location_number, json!("05"));

        let hall = &menu[0];
        assert_eq!(hall.location_name, json!("Hall 30"));
        assert_eq!(hall.meals.len(), 2);
        assert_eq!(hall.meals[0].meal_name, json!("Lunch"));
        assert_eq!(hall.meals[0].categories.len(), 2);
        assert_eq!(hall.meals[0].categories[0].category_number, json!(7));
        let names: Vec<_> = hall.meals[0].categories[0]
            .recipes
            .iter()
            .map(|r| r["Recipe_Print_As_Name"].clone())
            .collect();
        assert_eq!(names, vec![json!("Soup"), json!("Bread")]);
    }

    #[test]
    fn empty_input_yields_empty_menu() {
        assert!(group_menu(Vec::new()).is_empty());
    }

    #[test]
    fn serializes_camel_case() {
        let menu = group_menu(vec![recipe("05", 1, 3, "Eggs")]);
        let v = serde_json::to_value(&menu).unwrap();
        assert_eq!(v[0]["locationNumber"], "05");
        assert_eq!(v[0]["meals"][0]["mealNumber"], 1);
        assert_eq!(v[0]["meals"][0]["categories"][0]["categoryName"], "Cat 3");
    }
}
