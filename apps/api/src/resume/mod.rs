//! Resume records and their sections, served as CRUD routes behind the
//! authorization gate.

pub mod handlers;
pub mod models;
pub mod repository;
