//! Guarded with `#[cfg(test)]` from `lib.rs`: scenarios spanning the
//! service, the repositories and the store.


use anyhow::Result;
use maplit::hashset;

use crate::errors::Error;
use crate::repository::{InMemoryRepository, Repository};
use crate::services::Barista;
use crate::BaristaMatic;
use self::junk_drawer::{a_drink, an_ingredient, temporary_repository};

/// The behavioral contract both repository implementations have to satisfy.
macro_rules! repository_contract {
    ($name:ident, $make:expr) => {
        mod $name {
            use super::*;

            #[test]
            fn starts_empty() -> Result<()> {
                let repository = $make;

                assert!(repository.get_ingredients()?.is_empty());
                assert!(repository.get_drinks()?.is_empty());
                Ok(())
            }

            #[test]
            fn stores_ingredients_uniquely_by_name() -> Result<()> {
                let mut repository = $make;

                repository.add_ingredient(an_ingredient("Sugar", 10, 0.75))?;
                repository.add_ingredient(an_ingredient("Sugar", 99, 9.99))?;
                repository.add_ingredient(an_ingredient("Cocoa", 10, 0.9))?;

                let names = repository
                    .get_ingredients()?
                    .iter()
                    .map(|ingredient| ingredient.name())
                    .collect::<std::collections::HashSet<_>>();
                assert_eq!(names, hashset!["Sugar".to_string(), "Cocoa".to_string()]);
                Ok(())
            }

            #[test]
            fn the_first_ingredient_with_a_name_wins() -> Result<()> {
                let mut repository = $make;

                repository.add_ingredient(an_ingredient("Sugar", 10, 0.75))?;
                repository.add_ingredient(an_ingredient("Sugar", 99, 9.99))?;

                let stored = &repository.get_ingredients()?[0];
                assert_eq!(stored.available_quantity(), 10);
                Ok(())
            }

            #[test]
            fn adding_a_drink_registers_its_ingredients() -> Result<()> {
                let mut repository = $make;
                let espresso = an_ingredient("Espresso", 10, 1.1);
                let milk = an_ingredient("Steamed Milk", 10, 0.35);

                repository.add_drink(a_drink("Caffe Latte", vec![(&espresso, 2), (&milk, 1)]))?;

                assert_eq!(repository.get_ingredients()?.len(), 2);
                assert_eq!(repository.get_drinks()?.len(), 1);
                Ok(())
            }

            #[test]
            fn mutations_through_handles_survive_commit() -> Result<()> {
                let mut repository = $make;
                let espresso = an_ingredient("Espresso", 10, 1.1);
                repository.add_drink(a_drink("Caffe Americano", vec![(&espresso, 3)]))?;

                let drinks = repository.get_drinks()?;
                repository.transactionally(|_| Ok(drinks[0].dispense()?))?;

                let stocks = repository
                    .get_ingredients()?
                    .iter()
                    .map(|ingredient| ingredient.available_quantity())
                    .collect::<Vec<_>>();
                assert_eq!(stocks, vec![7]);
                Ok(())
            }
        }
    };
}

repository_contract!(in_memory_repository, InMemoryRepository::new());
repository_contract!(document_repository, temporary_repository());

mod barista_service {
    use super::*;

    fn with_repository(
        ingredients: Vec<crate::menu::SharedIngredient>,
        drinks: Vec<crate::menu::Drink>,
    ) -> Barista<InMemoryRepository> {
        let mut repository = InMemoryRepository::new();
        for ingredient in ingredients {
            repository.add_ingredient(ingredient).expect("add ingredient");
        }
        for drink in drinks {
            repository.add_drink(drink).expect("add drink");
        }
        Barista::new(repository)
    }

    #[test]
    fn inventory_of_an_empty_repository_is_empty() -> Result<()> {
        let barista = with_repository(vec![], vec![]);

        assert!(barista.get_inventory()?.is_empty());
        Ok(())
    }

    #[test]
    fn inventory_is_sorted_by_name_regardless_of_insertion_order() -> Result<()> {
        let barista = with_repository(
            vec![
                an_ingredient("ingredient 2", 10, 1.0),
                an_ingredient("ingredient 1", 10, 1.0),
            ],
            vec![],
        );

        let names = barista
            .get_inventory()?
            .iter()
            .map(|ingredient| ingredient.name())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["ingredient 1", "ingredient 2"]);
        Ok(())
    }

    #[test]
    fn the_menu_of_an_empty_repository_is_empty() -> Result<()> {
        let barista = with_repository(vec![], vec![]);

        assert_eq!(barista.get_menu()?.iter().count(), 0);
        Ok(())
    }

    #[test]
    fn the_menu_references_drinks_sorted_by_name() -> Result<()> {
        let ingredient_1 = an_ingredient("ingredient 1", 10, 1.0);
        let ingredient_2 = an_ingredient("ingredient 2", 10, 1.0);
        let barista = with_repository(
            vec![],
            vec![
                a_drink("drink b", vec![(&ingredient_1, 1), (&ingredient_2, 2)]),
                a_drink("drink a", vec![(&ingredient_1, 5)]),
            ],
        );

        let menu = barista.get_menu()?;
        assert_eq!(menu.resolve("1")?.name(), "drink a");
        assert_eq!(menu.resolve("2")?.name(), "drink b");
        Ok(())
    }

    #[test]
    fn dispenses_a_drink_by_menu_reference() -> Result<()> {
        let espresso = an_ingredient("Espresso", 10, 1.1);
        let mut barista = with_repository(
            vec![],
            vec![a_drink("Caffe Americano", vec![(&espresso, 3)])],
        );

        let dispensed = barista.dispense_by_reference("1")?;

        assert_eq!(dispensed.name(), "Caffe Americano");
        assert_eq!(format!("${:.2}", dispensed.cost()), "$3.30");
        assert_eq!(espresso.available_quantity(), 7);
        Ok(())
    }

    #[test]
    fn fails_when_the_reference_names_no_drink() {
        let mut barista = with_repository(vec![], vec![]);

        let err = barista
            .dispense_by_reference("1")
            .expect_err("nothing to dispense");

        match err.downcast::<Error>().expect("domain error") {
            Error::InvalidSelectedDrink(reference) => assert_eq!(reference, "1"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn propagates_out_of_stock_and_mutates_nothing() {
        let espresso = an_ingredient("Espresso", 1, 1.1);
        let mut barista = with_repository(
            vec![],
            vec![a_drink("Caffe Americano", vec![(&espresso, 3)])],
        );

        let err = barista
            .dispense_by_reference("1")
            .expect_err("should be out of stock");

        match err.downcast::<Error>().expect("domain error") {
            Error::OutOfStock(drink) => assert_eq!(drink.name(), "Caffe Americano"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(espresso.available_quantity(), 1);
    }

    #[test]
    fn restocks_a_single_ingredient() -> Result<()> {
        let espresso = an_ingredient("Espresso", 1, 1.1);
        let mut barista = with_repository(vec![espresso.clone()], vec![]);

        barista.restock_ingredient(&espresso, 5)?;

        assert_eq!(espresso.available_quantity(), 5);
        Ok(())
    }

    #[test]
    fn restocks_every_ingredient_to_the_same_quantity() -> Result<()> {
        let one = an_ingredient("one", 1, 1.0);
        let two = an_ingredient("two", 2, 1.0);
        let three = an_ingredient("three", 3, 1.0);
        let mut barista =
            with_repository(vec![one.clone(), two.clone(), three.clone()], vec![]);

        barista.restock_all(10)?;

        assert_eq!(one.available_quantity(), 10);
        assert_eq!(two.available_quantity(), 10);
        assert_eq!(three.available_quantity(), 10);
        Ok(())
    }
}

mod durable_store {
    use super::*;
    use crate::persistence::DocumentRepository;
    use super::junk_drawer::temporary_pool;

    #[test]
    fn dispensed_stock_survives_a_fresh_session() -> Result<()> {
        env_logger::try_init().unwrap_or_default();
        let pool = temporary_pool();

        {
            let espresso = an_ingredient("Espresso", 10, 1.1);
            let mut repository = DocumentRepository::new(pool.clone());
            repository.add_drink(a_drink("Caffe Americano", vec![(&espresso, 3)]))?;
            let mut barista = Barista::new(repository);
            barista.dispense_by_reference("1")?;
        }

        let barista = Barista::new(DocumentRepository::new(pool));
        let inventory = barista.get_inventory()?;
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory[0].name(), "Espresso");
        assert_eq!(inventory[0].available_quantity(), 7);
        Ok(())
    }

    #[test]
    fn setup_seeds_once_and_never_clobbers_live_stock() -> Result<()> {
        env_logger::try_init().unwrap_or_default();
        let bm = BaristaMatic::with_pool(temporary_pool());

        bm.setup()?;
        bm.setup()?;

        let mut barista = bm.barista();
        assert_eq!(barista.get_menu()?.iter().count(), 6);
        barista.dispense_by_reference("1")?; // Caffe Americano: espresso 10 -> 7

        bm.setup()?;

        let barista = bm.barista();
        let espresso = barista
            .get_inventory()?
            .into_iter()
            .find(|ingredient| ingredient.name() == "Espresso")
            .expect("espresso in inventory");
        assert_eq!(espresso.available_quantity(), 7);
        Ok(())
    }
}
