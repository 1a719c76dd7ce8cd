use std::cell::RefCell;
use std::collections::HashMap;

use anyhow::{Context, Result};
use log::*;
use r2d2::Pool;
use serde::{Deserialize, Serialize};

use infra::documents::{DocMeta, HasMeta};
use infra::ids::{Entity, Id};
use infra::persistence::Storage;

use crate::menu::{Drink, DrinkIngredient, Ingredient, SharedIngredient};
use crate::repository::Repository;

/// Stored form of an ingredient. Its id is hashed from the name, so the
/// store is name-keyed too.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientDoc {
    #[serde(flatten)]
    meta: DocMeta<IngredientDoc>,
    name: String,
    available_quantity: i64,
    unit_cost: f64,
}

/// Stored form of a drink; recipe lines point at ingredients by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrinkDoc {
    #[serde(flatten)]
    meta: DocMeta<DrinkDoc>,
    name: String,
    ingredients: Vec<RecipeLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecipeLine {
    ingredient: Id<IngredientDoc>,
    quantity: i64,
}

impl Entity for IngredientDoc {
    const PREFIX: &'static str = "ingredient";
}

impl Entity for DrinkDoc {
    const PREFIX: &'static str = "drink";
}

impl HasMeta for IngredientDoc {
    fn meta(&self) -> &DocMeta<Self> {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut DocMeta<Self> {
        &mut self.meta
    }
}

impl HasMeta for DrinkDoc {
    fn meta(&self) -> &DocMeta<Self> {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut DocMeta<Self> {
        &mut self.meta
    }
}

impl IngredientDoc {
    fn of(ingredient: &SharedIngredient) -> Self {
        let name = ingredient.name();
        IngredientDoc {
            meta: DocMeta::new_with_id(Id::hashed(&name)),
            name,
            available_quantity: ingredient.available_quantity(),
            unit_cost: ingredient.unit_cost(),
        }
    }
}

#[derive(Default)]
struct Session {
    ingredients: HashMap<String, CachedIngredient>,
    drinks: HashMap<String, Drink>,
}

struct CachedIngredient {
    handle: SharedIngredient,
    meta: DocMeta<IngredientDoc>,
}

/// Durable repository over the infra document store. Keeps a session
/// identity map so that every caller sees one shared handle per ingredient
/// name, and `commit` writes the handles' stock back to the store. When an
/// added name already exists, the existing record wins (set semantics; also
/// what keeps re-seeding from clobbering live stock).
pub struct DocumentRepository<M: r2d2::ManageConnection> {
    db: Pool<M>,
    session: RefCell<Session>,
}

impl<M, D> DocumentRepository<M>
where
    M: r2d2::ManageConnection<Connection = D>,
    D: Storage + Send + 'static,
{
    pub fn new(db: Pool<M>) -> Self {
        DocumentRepository {
            db,
            session: RefCell::new(Session::default()),
        }
    }

    fn conn(&self) -> Result<r2d2::PooledConnection<M>> {
        Ok(self.db.get()?)
    }

    fn adopt_ingredient(session: &mut Session, doc: IngredientDoc) -> SharedIngredient {
        let cached = session
            .ingredients
            .entry(doc.name.clone())
            .or_insert_with(move || {
                let handle = SharedIngredient::new(Ingredient::new(
                    &doc.name,
                    doc.available_quantity,
                    doc.unit_cost,
                ));
                CachedIngredient {
                    handle,
                    meta: doc.meta,
                }
            });
        cached.handle.clone()
    }

    fn ingredient_by_id(
        &self,
        conn: &D,
        session: &mut Session,
        id: &Id<IngredientDoc>,
    ) -> Result<SharedIngredient> {
        if let Some(cached) = session.ingredients.values().find(|c| c.meta.id == *id) {
            return Ok(cached.handle.clone());
        }
        let doc = conn
            .load::<IngredientDoc>(id)?
            .ok_or_else(|| anyhow::anyhow!("missing ingredient: {}", id))?;
        Ok(Self::adopt_ingredient(session, doc))
    }

    fn adopt_drink(&self, conn: &D, session: &mut Session, doc: DrinkDoc) -> Result<Drink> {
        if let Some(drink) = session.drinks.get(&doc.name) {
            return Ok(drink.clone());
        }
        let mut lines = Vec::with_capacity(doc.ingredients.len());
        for line in &doc.ingredients {
            let handle = self.ingredient_by_id(conn, session, &line.ingredient)?;
            lines.push(DrinkIngredient::new(handle, line.quantity));
        }
        let drink = Drink::new(&doc.name, lines);
        session.drinks.insert(doc.name.clone(), drink.clone());
        Ok(drink)
    }

    fn register_ingredient(
        &self,
        conn: &D,
        session: &mut Session,
        ingredient: SharedIngredient,
    ) -> Result<()> {
        let name = ingredient.name();
        if session.ingredients.contains_key(&name) {
            return Ok(());
        }
        let id = Id::hashed(&name);
        if let Some(stored) = conn.load::<IngredientDoc>(&id)? {
            debug!("Ingredient {} already stored; adopting stored state", name);
            Self::adopt_ingredient(session, stored);
            return Ok(());
        }
        let mut doc = IngredientDoc::of(&ingredient);
        conn.save(&mut doc)
            .with_context(|| format!("save ingredient {}", name))?;
        session.ingredients.insert(
            name,
            CachedIngredient {
                handle: ingredient,
                meta: doc.meta,
            },
        );
        Ok(())
    }
}

impl<M, D> Repository for DocumentRepository<M>
where
    M: r2d2::ManageConnection<Connection = D>,
    D: Storage + Send + 'static,
{
    fn get_ingredients(&self) -> Result<Vec<SharedIngredient>> {
        let conn = self.conn()?;
        let mut session = self.session.borrow_mut();
        for doc in conn.all::<IngredientDoc>()? {
            Self::adopt_ingredient(&mut session, doc);
        }
        Ok(session
            .ingredients
            .values()
            .map(|cached| cached.handle.clone())
            .collect())
    }

    fn get_drinks(&self) -> Result<Vec<Drink>> {
        let conn = self.conn()?;
        let mut session = self.session.borrow_mut();
        let mut drinks = Vec::new();
        for doc in conn.all::<DrinkDoc>()? {
            drinks.push(self.adopt_drink(&*conn, &mut session, doc)?);
        }
        Ok(drinks)
    }

    fn add_ingredient(&mut self, ingredient: SharedIngredient) -> Result<()> {
        let conn = self.conn()?;
        let mut session = self.session.borrow_mut();
        self.register_ingredient(&*conn, &mut session, ingredient)
    }

    fn add_drink(&mut self, drink: Drink) -> Result<()> {
        let conn = self.conn()?;
        let mut session = self.session.borrow_mut();
        for line in drink.ingredients() {
            self.register_ingredient(&*conn, &mut session, line.ingredient().clone())?;
        }
        let name = drink.name().to_string();
        if session.drinks.contains_key(&name) {
            return Ok(());
        }
        let id = Id::hashed(&name);
        if let Some(stored) = conn.load::<DrinkDoc>(&id)? {
            debug!("Drink {} already stored; adopting stored state", name);
            self.adopt_drink(&*conn, &mut session, stored)?;
            return Ok(());
        }
        let mut doc = DrinkDoc {
            meta: DocMeta::new_with_id(id),
            name: name.clone(),
            ingredients: drink
                .ingredients()
                .iter()
                .map(|line| RecipeLine {
                    ingredient: Id::hashed(&line.ingredient().name()),
                    quantity: line.ingredient_quantity(),
                })
                .collect(),
        };
        conn.save(&mut doc)
            .with_context(|| format!("save drink {}", name))?;
        session.drinks.insert(name, drink);
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        let conn = self.conn()?;
        let mut session = self.session.borrow_mut();
        for cached in session.ingredients.values_mut() {
            let mut doc = IngredientDoc {
                meta: cached.meta.clone(),
                name: cached.handle.name(),
                available_quantity: cached.handle.available_quantity(),
                unit_cost: cached.handle.unit_cost(),
            };
            conn.save(&mut doc)
                .with_context(|| format!("save ingredient {}", doc.name))?;
            cached.meta = doc.meta;
        }
        conn.flush().context("flush store")?;
        debug!("Committed {} ingredients", session.ingredients.len());
        Ok(())
    }
}
