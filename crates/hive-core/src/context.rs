//! Per-request state that travels with a query down the agent tree
//!
//! The HTTP layer creates one `Context` per request. Agents hand the same
//! context to their tools, so a member three teams down still sees the
//! request id and knows how deep it sits.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Request state shared by every agent working on one query
///
/// # Example
///
/// ```
/// use hive_core::Context;
///
/// let mut ctx = Context::new().with_request_id("req-1");
/// assert_eq!(ctx.delegation_depth(), 0);
///
/// ctx.enter_delegation("Autonomous Orchestrator");
/// assert_eq!(ctx.delegation_depth(), 1);
/// assert_eq!(ctx.request_id(), Some("req-1"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    request_id: Option<String>,
    session_id: Option<String>,
    /// Leaders that handed work down, outermost first
    delegation_path: Vec<String>,
    values: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Number of transfers between the root agent and the current one
    pub fn delegation_depth(&self) -> usize {
        self.delegation_path.len()
    }

    pub fn delegation_path(&self) -> &[String] {
        &self.delegation_path
    }

    /// Record that `leader` is handing work one level down
    ///
    /// Returns the new depth. Pair every call with
    /// [`Context::exit_delegation`] once the member has answered.
    pub fn enter_delegation(&mut self, leader: &str) -> usize {
        self.delegation_path.push(leader.to_string());
        self.delegation_path.len()
    }

    pub fn exit_delegation(&mut self) {
        self.delegation_path.pop();
    }

    /// Attach an arbitrary value
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Attach any serializable value
    pub fn insert_typed<T: Serialize>(&mut self, key: impl Into<String>, value: &T) -> crate::Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| crate::Error::ProcessingFailed(format!("context value is not serializable: {e}")))?;
        self.values.insert(key.into(), value);
        Ok(())
    }

    /// Read a value back as `T`; `Ok(None)` when the key is absent
    pub fn get_typed<T: DeserializeOwned>(&self, key: &str) -> crate::Result<Option<T>> {
        self.values
            .get(key)
            .map(|value| {
                T::deserialize(value).map_err(|e| {
                    crate::Error::ProcessingFailed(format!("context value '{key}' has the wrong shape: {e}"))
                })
            })
            .transpose()
    }

    /// Number of attached values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Take ids and values from `other`; its entries win on conflict
    ///
    /// The delegation path is left alone: it belongs to the running call.
    pub fn merge(&mut self, other: Context) {
        if other.request_id.is_some() {
            self.request_id = other.request_id;
        }
        if other.session_id.is_some() {
            self.session_id = other.session_id;
        }
        self.values.extend(other.values);
    }
}
