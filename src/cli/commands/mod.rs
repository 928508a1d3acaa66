pub mod admin;
pub mod bootstrap;
pub mod token;
