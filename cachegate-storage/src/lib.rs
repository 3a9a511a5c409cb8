pub mod error;
pub mod store;
#[cfg(feature = "memory")]
pub mod memory;

pub use error::StoreError;
#[cfg(feature = "memory")]
pub use memory::MemoryHashStore;
pub use store::HashStore;
