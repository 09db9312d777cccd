pub mod render;
pub mod router;
pub mod types;
pub mod handlers {
    pub mod health;
    pub mod pages;
    pub mod text;
}

pub use router::{create_app, create_router};
pub use types::AppState;
