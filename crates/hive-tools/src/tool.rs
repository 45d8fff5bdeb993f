//! The [`Tool`] trait: something a model can call by name

use async_trait::async_trait;
use hive_core::{Context, Result};
use serde_json::Value;

/// A function exposed to the model
///
/// The model picks a tool by [`Tool::name`] and fills its arguments from
/// [`Tool::input_schema`]. An `Err` goes back to the model as an error
/// result; the run carries on.
#[async_trait]
pub trait Tool: Send + Sync {
    async fn execute(&self, params: Value) -> Result<Value>;

    /// What the executor actually calls
    ///
    /// Only delegation tools need the request context; the default drops it.
    async fn execute_with_context(&self, params: Value, _context: &mut Context) -> Result<Value> {
        self.execute(params).await
    }

    /// Unique within one agent's registry
    fn name(&self) -> &str;

    /// Shown to the model to decide when the tool fits
    fn description(&self) -> &str;

    /// JSON Schema for the arguments object
    fn input_schema(&self) -> Value;
}
