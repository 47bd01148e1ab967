use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::sync::Synchronizer;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub synchronizer: Synchronizer,
}
