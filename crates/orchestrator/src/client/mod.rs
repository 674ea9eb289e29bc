//! Client side of the remote inventory dependency.
//!
//! Split along two seams so each piece can be tested and swapped alone:
//! - [`InventoryTransport`]: one raw call attempt against one resolved
//!   instance (HTTP in production, scripted in tests)
//! - [`StockChecker`]: the resilient view the orchestrator consumes; its
//!   answer is either a verified report or the fallback sentinel, never
//!   an error

pub mod memory;
pub mod resilient;
pub mod transport;

pub use memory::InMemoryStockChecker;
pub use resilient::{INVENTORY_SERVICE, ResilientInventoryClient, StockCheck, StockChecker};
pub use transport::{HttpInventoryTransport, InventoryTransport};
