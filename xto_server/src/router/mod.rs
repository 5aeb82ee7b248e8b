pub mod bridge;
pub mod page;
