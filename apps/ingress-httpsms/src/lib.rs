pub mod config;
pub mod error;
pub mod http;
pub mod reqid;
pub mod respond;

mod main_logic;

pub use config::IngressConfig;
pub use http::{AppState, build_router};
pub use main_logic::{build_pipeline, run};
