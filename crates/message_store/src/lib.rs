mod error;
mod message;
mod store;

pub use error::MessageStoreError;
pub use message::{Message, Role};
pub use store::MessageStore;
