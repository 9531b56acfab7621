pub mod health;
pub mod news;
pub mod proxy;

pub use health::{health_check, index, metrics, readiness_check, INDEX_MESSAGE};
pub use news::{list_news, NewsParams};
pub use proxy::proxy_request;
