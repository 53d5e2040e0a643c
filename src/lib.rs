pub mod utils;
pub mod models;
pub mod shapes;
pub mod interactions;
pub mod scene;
