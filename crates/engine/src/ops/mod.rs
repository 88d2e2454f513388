use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{CategoryStore, ResultEngine, SqlCategoryStore};

mod batch;
mod categories;
mod companies;
mod hierarchy;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    store: Arc<dyn CategoryStore>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    store: Option<Arc<dyn CategoryStore>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Replace the category store. By default categories are read and
    /// written through a [`SqlCategoryStore`] on the same database.
    pub fn store(mut self, store: impl CategoryStore + 'static) -> EngineBuilder {
        self.store = Some(Arc::new(store));
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let store = match self.store {
            Some(store) => store,
            None => Arc::new(SqlCategoryStore::new(self.database.clone())),
        };
        Ok(Engine {
            database: self.database,
            store,
        })
    }
}
