pub mod router;
pub mod types;
pub mod handlers {
    pub mod auth;
    pub mod certificates;
    pub mod common;
    pub mod dashboards;
    pub mod health;
}

pub use router::{create_router, ApiDoc};
pub use types::AppState;
