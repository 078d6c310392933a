//! Business rules that don't touch the database.
//!
//! Services call into these to derive statuses, generate identifiers and
//! validate state transitions, so the rules can be tested without a
//! connection.

pub mod barcode;
pub mod csv;
pub mod pagination;
pub mod payloads;
pub mod quality;
pub mod stage;
pub mod status;

pub use pagination::{Pagination, PaginationMeta};
pub use stage::{StageAction, StageStatus};
pub use status::{
    AssemblyStatus, ComponentType, ItemStatus, MovementType, OrderStatus, OrderType, ProductionStatus,
    QualityResult, SubProductStatus,
};
