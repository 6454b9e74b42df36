mod events;
mod store;

pub use events::{LibraryEvent, Observers};
pub use store::LibraryStore;
