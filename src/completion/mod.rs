pub mod events;
pub mod sink;
pub mod store;
pub mod submit;
pub mod types;

pub use events::{CompletionEvent, EventSink, LogEvents};
pub use sink::CompletionSink;
pub use store::LocalStore;
pub use submit::{prepare_submission, submit_completion, SubmitError, Submitted};
pub use types::{CompletionLog, CompletionRecord, NewCompletion, Review};
