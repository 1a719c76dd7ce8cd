use anyhow::{Context, Result};
use log::*;
use r2d2::Pool;

use infra::persistence::DocumentConnectionManager;

pub mod catalog;
pub mod cli;
pub mod config;
pub mod errors;
pub mod menu;
pub mod persistence;
pub mod repository;
pub mod services;
#[cfg(test)]
mod test;

use crate::persistence::DocumentRepository;
use crate::repository::Repository;
use crate::services::Barista;

/// Root wiring: owns the store pool and hands out configured services.
#[derive(Debug, Clone)]
pub struct BaristaMatic {
    db: Pool<DocumentConnectionManager>,
}

impl BaristaMatic {
    pub fn new(config: &config::Config) -> Result<Self> {
        Ok(Self::with_pool(config.db.build()?))
    }

    pub fn with_pool(db: Pool<DocumentConnectionManager>) -> Self {
        BaristaMatic { db }
    }

    /// Seeds the default drink catalog. Safe to run repeatedly: documents
    /// already in the store win over the seed data.
    pub fn setup(&self) -> Result<()> {
        info!("Seeding default catalog");
        let mut repository = DocumentRepository::new(self.db.clone());
        for drink in catalog::default_catalog() {
            repository.add_drink(drink)?;
        }
        repository.commit().context("seed catalog")?;
        Ok(())
    }

    pub fn barista(&self) -> Barista<DocumentRepository<DocumentConnectionManager>> {
        Barista::new(DocumentRepository::new(self.db.clone()))
    }
}
