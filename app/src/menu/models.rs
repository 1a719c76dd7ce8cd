use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::errors::Error;

/// An inventory item. Equality and hashing are keyed purely by name: two
/// records with the same name are the same ingredient to the repository
/// layer, whatever the rest of their state says. That is intentional, and it
/// matches the store's name-derived document ids.
#[derive(Debug, Clone)]
pub struct Ingredient {
    name: String,
    available_quantity: i64,
    unit_cost: f64,
}

impl Ingredient {
    pub fn new(name: &str, available_quantity: i64, unit_cost: f64) -> Self {
        Ingredient {
            name: name.to_string(),
            available_quantity,
            unit_cost,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn available_quantity(&self) -> i64 {
        self.available_quantity
    }

    pub fn unit_cost(&self) -> f64 {
        self.unit_cost
    }

    /// True iff the stock covers `quantity`.
    pub fn can_deallocate(&self, quantity: i64) -> bool {
        self.available_quantity >= quantity
    }

    /// Subtracts `quantity` from the stock. Deliberately unchecked: the
    /// sufficiency gate lives in [`Drink::dispense`], and misusing this
    /// directly can drive the stock negative.
    pub fn deallocate(&mut self, quantity: i64) {
        self.available_quantity -= quantity;
    }

    pub fn cost_for(&self, quantity: i64) -> f64 {
        self.unit_cost * quantity as f64
    }

    /// Sets the stock to `quantity` as-is; the value is not validated.
    pub fn restock_to(&mut self, quantity: i64) {
        self.available_quantity = quantity;
    }
}

impl PartialEq for Ingredient {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Ingredient {}

impl Hash for Ingredient {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state)
    }
}

/// Shared-ownership handle to an ingredient. Every recipe line referencing
/// an ingredient holds one of these, so a stock mutation through any handle
/// is visible to all of them. The mutex keeps the handle `Send + Sync`;
/// execution stays single-threaded.
#[derive(Debug, Clone)]
pub struct SharedIngredient(Arc<Mutex<Ingredient>>);

impl SharedIngredient {
    pub fn new(ingredient: Ingredient) -> Self {
        SharedIngredient(Arc::new(Mutex::new(ingredient)))
    }

    fn lock(&self) -> MutexGuard<Ingredient> {
        self.0.lock().expect("ingredient lock")
    }

    pub fn name(&self) -> String {
        self.lock().name().to_string()
    }

    pub fn available_quantity(&self) -> i64 {
        self.lock().available_quantity()
    }

    pub fn unit_cost(&self) -> f64 {
        self.lock().unit_cost()
    }

    pub fn can_deallocate(&self, quantity: i64) -> bool {
        self.lock().can_deallocate(quantity)
    }

    pub fn deallocate(&self, quantity: i64) {
        self.lock().deallocate(quantity)
    }

    pub fn cost_for(&self, quantity: i64) -> f64 {
        self.lock().cost_for(quantity)
    }

    pub fn restock_to(&self, quantity: i64) {
        self.lock().restock_to(quantity)
    }
}

impl PartialEq for SharedIngredient {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for SharedIngredient {}

impl Hash for SharedIngredient {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state)
    }
}

/// One line of a drink's recipe: an ingredient and how much of it one unit
/// of the drink consumes.
#[derive(Debug, Clone)]
pub struct DrinkIngredient {
    ingredient: SharedIngredient,
    ingredient_quantity: i64,
}

impl DrinkIngredient {
    pub fn new(ingredient: SharedIngredient, ingredient_quantity: i64) -> Self {
        DrinkIngredient {
            ingredient,
            ingredient_quantity,
        }
    }

    pub fn ingredient(&self) -> &SharedIngredient {
        &self.ingredient
    }

    pub fn ingredient_quantity(&self) -> i64 {
        self.ingredient_quantity
    }

    pub fn can_be_dispensed(&self) -> bool {
        self.ingredient.can_deallocate(self.ingredient_quantity)
    }

    pub fn dispense(&self) {
        self.ingredient.deallocate(self.ingredient_quantity)
    }

    pub fn cost(&self) -> f64 {
        self.ingredient.cost_for(self.ingredient_quantity)
    }
}

impl PartialEq for DrinkIngredient {
    fn eq(&self, other: &Self) -> bool {
        self.ingredient == other.ingredient
    }
}

impl Eq for DrinkIngredient {}

impl Hash for DrinkIngredient {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ingredient.hash(state)
    }
}

/// A named recipe: an ordered list of ingredient lines. Identity is the
/// name; the line-up never changes after construction, though the referenced
/// ingredients' stock does. Cloning clones the handles, preserving sharing.
#[derive(Debug, Clone)]
pub struct Drink {
    name: String,
    ingredients: Vec<DrinkIngredient>,
}

impl Drink {
    pub fn new(name: &str, ingredients: Vec<DrinkIngredient>) -> Self {
        Drink {
            name: name.to_string(),
            ingredients,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ingredients(&self) -> &[DrinkIngredient] {
        &self.ingredients
    }

    /// True iff every line can be dispensed; vacuously true with no lines.
    pub fn can_be_dispensed(&self) -> bool {
        self.ingredients.iter().all(DrinkIngredient::can_be_dispensed)
    }

    /// All-or-nothing: checks the whole recipe first, and only then consumes
    /// stock, line by line. The check-then-act holds under a single writer;
    /// processes sharing one store could race between the two steps.
    pub fn dispense(&self) -> Result<(), Error> {
        if !self.can_be_dispensed() {
            return Err(Error::OutOfStock(self.clone()));
        }
        for line in &self.ingredients {
            line.dispense();
        }
        Ok(())
    }

    pub fn cost(&self) -> f64 {
        self.ingredients.iter().map(DrinkIngredient::cost).sum()
    }
}

impl fmt::Display for Drink {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.name)
    }
}

impl PartialEq for Drink {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Drink {}

impl Hash for Drink {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state)
    }
}
