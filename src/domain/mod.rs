pub mod catalog;
pub mod collision;
pub mod progress;
pub mod score;
pub mod token;
