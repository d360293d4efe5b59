pub mod catalog;
pub mod email;
pub mod ownership;
pub mod upload;
