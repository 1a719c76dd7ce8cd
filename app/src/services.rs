use anyhow::Result;
use log::*;

use crate::menu::{Drink, Menu, SharedIngredient};
use crate::repository::Repository;

/// Orchestrates the domain against a repository. Domain failures
/// ([`crate::errors::Error`]) pass through untranslated; rendering them is
/// the presentation layer's job.
#[derive(Debug)]
pub struct Barista<R> {
    repository: R,
}

impl<R: Repository> Barista<R> {
    pub fn new(repository: R) -> Self {
        Barista { repository }
    }

    /// The full ingredient set, sorted by name (ordinal, case-sensitive).
    pub fn get_inventory(&self) -> Result<Vec<SharedIngredient>> {
        let mut ingredients = self.repository.get_ingredients()?;
        ingredients.sort_by_key(SharedIngredient::name);
        Ok(ingredients)
    }

    /// The current menu: drinks sorted by name, references assigned from "1".
    pub fn get_menu(&self) -> Result<Menu> {
        let mut drinks = self.repository.get_drinks()?;
        drinks.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(Menu::build(drinks))
    }

    /// Resolves `reference` against the current menu and dispenses the drink
    /// within a commit scope.
    pub fn dispense_by_reference(&mut self, reference: &str) -> Result<Drink> {
        let menu = self.get_menu()?;
        let drink = menu.resolve(reference)?.clone();
        debug!("Dispensing {} (reference {})", drink, reference);
        self.repository.transactionally(|_| Ok(drink.dispense()?))?;
        Ok(drink)
    }

    /// Sets one ingredient's stock to an absolute quantity, within a commit
    /// scope.
    pub fn restock_ingredient(
        &mut self,
        ingredient: &SharedIngredient,
        quantity: i64,
    ) -> Result<()> {
        debug!("Restocking {} to {}", ingredient.name(), quantity);
        self.repository.transactionally(|_| {
            ingredient.restock_to(quantity);
            Ok(())
        })
    }

    /// Restocks every ingredient to the same absolute quantity. Each restock
    /// is independent and idempotent, so iteration order does not matter.
    pub fn restock_all(&mut self, quantity: i64) -> Result<()> {
        for ingredient in self.repository.get_ingredients()? {
            self.restock_ingredient(&ingredient, quantity)?;
        }
        Ok(())
    }
}
