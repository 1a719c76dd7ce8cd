pub mod models;

pub use self::models::{Drink, DrinkIngredient, Ingredient, SharedIngredient};

use crate::errors::Error;

/// Assigns positional references "1".."N" to drinks, in the order given.
/// Built fresh from the current drink list on every request; references are
/// not stable across rebuilds. Callers wanting a particular order (the
/// service sorts by name) must sort before building.
#[derive(Debug, Clone, PartialEq)]
pub struct Menu {
    items: Vec<(String, Drink)>,
}

impl Menu {
    pub fn build<I: IntoIterator<Item = Drink>>(drinks: I) -> Self {
        let items = drinks
            .into_iter()
            .enumerate()
            .map(|(index, drink)| ((index + 1).to_string(), drink))
            .collect();
        Menu { items }
    }

    pub fn has_reference(&self, reference: &str) -> bool {
        self.items.iter().any(|(r, _)| r == reference)
    }

    pub fn resolve(&self, reference: &str) -> Result<&Drink, Error> {
        self.items
            .iter()
            .find(|(r, _)| r == reference)
            .map(|(_, drink)| drink)
            .ok_or_else(|| Error::InvalidSelectedDrink(reference.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Drink)> {
        self.items.iter().map(|(r, drink)| (r.as_str(), drink))
    }
}
