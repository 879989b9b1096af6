use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A callable tool: name, description and the parameters it accepts.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolManifest {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<ToolPort>,
}

impl ToolManifest {
    pub fn builder(name: impl Into<String>) -> ToolManifestBuilder {
        ToolManifestBuilder::new(name)
    }

    pub fn input(&self, name: &str) -> Option<&ToolPort> {
        self.inputs.iter().find(|port| port.name == name)
    }

    /// Wire form used by `tools/list`.
    pub fn descriptor(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema(),
        })
    }

    /// JSON Schema object describing the tool arguments.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for port in &self.inputs {
            properties.insert(port.name.clone(), port.schema());
        }
        let required: Vec<&str> = self
            .inputs
            .iter()
            .filter(|port| port.required)
            .map(|port| port.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolPort {
    pub name: String,
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl ToolPort {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: "string".to_string(),
            description: None,
            required: false,
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn schema(&self) -> Value {
        let mut schema = json!({ "type": self.type_name });
        if let Some(description) = &self.description {
            schema["description"] = json!(description);
        }
        schema
    }
}

#[derive(Clone, Debug)]
pub struct ToolManifestBuilder {
    manifest: ToolManifest,
}

impl ToolManifestBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            manifest: ToolManifest {
                name: name.into(),
                description: String::new(),
                inputs: Vec::new(),
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.manifest.description = description.into();
        self
    }

    pub fn input(mut self, port: ToolPort) -> Self {
        self.manifest.inputs.push(port);
        self
    }

    pub fn build(self) -> ToolManifest {
        self.manifest
    }
}
