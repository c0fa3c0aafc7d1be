//! Custody records and the occupancy bookkeeping that ties them together.
//!
//! Inmates, cells and cell blocks are separate documents. Admitting or
//! releasing an inmate goes through [`OccupancyCoordinator`], which updates the
//! cell roster and recomputes the owning block's cached aggregate. Everything
//! else is plain per-collection CRUD over [`Records`].

pub mod dashboard;
pub mod error;
pub mod memory;
pub mod models;
pub mod occupancy;
pub mod store;
pub mod visitors;

pub use dashboard::summarize;
pub use error::{CustodyError, CustodyResult};
pub use memory::MemoryStore;
pub use models::{
    Cell, CellBlock, CellStatus, DashboardSummary, Inmate, Record, Staff, StaffStatus, Visitor,
    WeeklyActivity,
};
pub use occupancy::{InmateLookup, OccupancyCoordinator, Placement, DEFAULT_RETRY_LIMIT};
pub use store::{Document, DocumentStore, Records, Repository, Versioned};
pub use visitors::{register_visitor, upsert_visitor};
