pub mod auth;
pub mod db;
pub mod fetch;
pub mod notify;
pub mod search;
pub mod security;
pub mod storage;
