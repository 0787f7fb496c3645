pub mod catalog;
pub mod config;
pub mod converter;
pub mod error;
pub mod index;
pub mod mime;
pub mod node;
pub mod path_guard;
pub mod resolver;
pub mod server;
pub mod tree;
