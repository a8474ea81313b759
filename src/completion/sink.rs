use anyhow::Result;

use super::types::NewCompletion;

/// Persistence collaborator that accepts a fully assembled completion.
///
/// Implementations perform one atomic create and return the new record id.
#[allow(async_fn_in_trait)]
pub trait CompletionSink {
    async fn create(&self, completion: &NewCompletion) -> Result<String>;
}
