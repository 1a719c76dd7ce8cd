use std::collections::HashMap;

use anyhow::Result;
use log::*;

use crate::menu::{Drink, SharedIngredient};

/// What the core needs from a store of ingredients and drinks. Both
/// collections behave as sets keyed by name; `commit` durably persists
/// pending mutations.
pub trait Repository {
    fn get_ingredients(&self) -> Result<Vec<SharedIngredient>>;
    fn get_drinks(&self) -> Result<Vec<Drink>>;
    fn add_ingredient(&mut self, ingredient: SharedIngredient) -> Result<()>;
    /// Adding a drink also registers each of its ingredients.
    fn add_drink(&mut self, drink: Drink) -> Result<()>;
    fn commit(&mut self) -> Result<()>;

    /// Scoped commit: runs `body`, commits whether it succeeded or not, and
    /// hands the body's result back. There is no rollback arm yet; the
    /// `Result` return leaves room to add one without changing callers.
    fn transactionally<T, F>(&mut self, body: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let res = body(self);
        self.commit()?;
        res
    }
}

/// Store-free implementation: the conforming fake next to
/// [`crate::persistence::DocumentRepository`], and what most tests run
/// against.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    ingredients: HashMap<String, SharedIngredient>,
    drinks: HashMap<String, Drink>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Repository for InMemoryRepository {
    fn get_ingredients(&self) -> Result<Vec<SharedIngredient>> {
        Ok(self.ingredients.values().cloned().collect())
    }

    fn get_drinks(&self) -> Result<Vec<Drink>> {
        Ok(self.drinks.values().cloned().collect())
    }

    fn add_ingredient(&mut self, ingredient: SharedIngredient) -> Result<()> {
        self.ingredients
            .entry(ingredient.name())
            .or_insert(ingredient);
        Ok(())
    }

    fn add_drink(&mut self, drink: Drink) -> Result<()> {
        for line in drink.ingredients() {
            self.add_ingredient(line.ingredient().clone())?;
        }
        self.drinks.entry(drink.name().to_string()).or_insert(drink);
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        trace!("commit is a no-op without a store");
        Ok(())
    }
}
