pub mod checklist;
pub mod completion;
pub mod config;
pub mod draft;
pub mod output;
pub mod remote;
pub mod scoring;
