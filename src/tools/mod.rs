pub mod manifest;
pub mod registry;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use manifest::{ToolManifest, ToolManifestBuilder, ToolPort};
pub use registry::{
    ToolRegistry, GENERATE_FROM_IMAGE, GENERATE_FROM_TEXT, INPUT_IMAGE_PATH, PROMPT,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolInvocation {
    pub fn new<T: Into<String>>(name: T, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Non-empty string argument, or `None` when absent, not a string or empty.
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.arguments
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }
}
