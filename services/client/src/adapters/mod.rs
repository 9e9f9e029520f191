pub mod credentials;
pub mod db;
pub mod http;
pub mod preferences;
pub mod session_store;
