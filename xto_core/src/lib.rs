pub mod bridge;
pub mod cache;
mod config;
mod context;
mod error;
pub mod graphql;
pub mod interceptor;
mod page;
pub mod params;
pub mod scanner;
pub mod text;

pub use crate::config::Config;
pub use crate::context::PageContext;
pub use crate::error::{Error, Result};
pub use crate::page::Page;
