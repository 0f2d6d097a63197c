//! Módulo de base de datos
//!
//! Unidades de trabajo sobre PostgreSQL o en memoria.

pub mod connection;
pub mod memory;
pub mod postgres;
pub mod unit_of_work;

pub use connection::DatabaseConnection;
pub use memory::{Fault, FaultPoint, MemoryStore};
pub use postgres::PgFleetStore;
pub use unit_of_work::{complete, complete_atomic, FleetStore, UnitOfWork};
