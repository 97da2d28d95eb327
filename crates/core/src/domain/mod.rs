pub mod book;
pub mod order;
pub mod session;
