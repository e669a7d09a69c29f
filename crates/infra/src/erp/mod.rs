//! ERP adapters.

pub mod in_memory;
pub mod odata;

pub use in_memory::{InMemoryErp, RecordedUpdate};
pub use odata::{ErpConfig, ODataErpClient};
