use std::sync::Arc;

use super::{
    config::Config,
    database::{CandidateStore, init_mongo},
};

pub struct State {
    pub config: Config,
    pub store: Arc<dyn CandidateStore>,
}

impl State {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let store = init_mongo(&config.mongodb_uri, &config.database)
            .await
            .expect("Failed to connect to MongoDB!");

        Self::with_store(config, Arc::new(store))
    }

    pub fn with_store(config: Config, store: Arc<dyn CandidateStore>) -> Arc<Self> {
        Arc::new(Self { config, store })
    }
}
