pub mod app_config;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod constants;
pub mod db;
pub mod error;
pub mod image;
pub mod import;
pub mod middleware;
pub mod orm;
pub mod pagination;
pub mod recipe;
pub mod shopping_cart;
pub mod short_link;
pub mod storage;
pub mod subscriptions;
pub mod user;
pub mod web;
