use crate::menu::{Drink, DrinkIngredient, Ingredient, SharedIngredient};

/// Stock level every ingredient starts (and restocks) at.
pub const DEFAULT_QUANTITY: i64 = 10;

/// The canonical machine: the drinks (and, transitively, the ingredients)
/// that `setup` seeds into a fresh store.
pub fn default_catalog() -> Vec<Drink> {
    let coffee = ingredient("Coffee", 0.75);
    let decaf_coffee = ingredient("Decaf Coffee", 0.75);
    let sugar = ingredient("Sugar", 0.75);
    let cream = ingredient("Cream", 0.25);
    let steamed_milk = ingredient("Steamed Milk", 0.35);
    let foamed_milk = ingredient("Foamed Milk", 0.35);
    let espresso = ingredient("Espresso", 1.1);
    let cocoa = ingredient("Cocoa", 0.9);
    let whipped_cream = ingredient("Whipped Cream", 1.0);

    vec![
        drink("Coffee", vec![(&coffee, 3), (&sugar, 1), (&cream, 1)]),
        drink(
            "Decaf Coffee",
            vec![(&decaf_coffee, 3), (&sugar, 1), (&cream, 1)],
        ),
        drink("Caffe Latte", vec![(&espresso, 2), (&steamed_milk, 1)]),
        drink("Caffe Americano", vec![(&espresso, 3)]),
        drink(
            "Caffe Mocha",
            vec![
                (&espresso, 1),
                (&cocoa, 1),
                (&steamed_milk, 1),
                (&whipped_cream, 1),
            ],
        ),
        drink(
            "Cappuccino",
            vec![(&espresso, 2), (&steamed_milk, 1), (&foamed_milk, 1)],
        ),
    ]
}

fn ingredient(name: &str, unit_cost: f64) -> SharedIngredient {
    SharedIngredient::new(Ingredient::new(name, DEFAULT_QUANTITY, unit_cost))
}

fn drink(name: &str, lines: Vec<(&SharedIngredient, i64)>) -> Drink {
    Drink::new(
        name,
        lines
            .into_iter()
            .map(|(ingredient, quantity)| DrinkIngredient::new(ingredient.clone(), quantity))
            .collect(),
    )
}
