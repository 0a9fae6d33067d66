use apiary_common::pricing::FeeSchedule;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub boot_id: String,
    pub git_sha: Option<String>,
    pub db_pool: SqlitePool,
    /// Fixed for the life of the process; the pricing engine never reads
    /// ambient configuration. A fee change means restarting with a new
    /// schedule value.
    pub fees: FeeSchedule,
}

impl AppState {
    pub fn new(
        boot_id: String,
        git_sha: Option<String>,
        db_pool: SqlitePool,
        fees: FeeSchedule,
    ) -> Self {
        Self {
            boot_id,
            git_sha,
            db_pool,
            fees,
        }
    }
}
