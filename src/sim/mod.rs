pub mod controller;
pub mod event;
pub mod level;
pub mod runner;
pub mod save;
pub mod session;
pub mod stage;
