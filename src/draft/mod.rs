pub mod storage;
pub mod types;

pub use storage::{discard_draft, draft_path, load_draft, save_draft};
pub use types::{Draft, DRAFT_VERSION};
