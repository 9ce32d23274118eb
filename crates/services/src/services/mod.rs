pub mod auth;
pub mod config;
pub mod contact;
pub mod crud;
pub mod data_provider;
pub mod database_validator;
pub mod form;
pub mod media;
pub mod record_store;
pub mod resource_forms;
pub mod seed;
pub mod settings;
pub mod table;
