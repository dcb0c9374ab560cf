//! Parameter schemas and the argument mapping supplied by the model.
//!
//! Every tool declares its parameters once; the declaration drives both the
//! model-facing schema advertisement and pre-dispatch validation, so a
//! missing required field is caught before a tool body runs.

use serde_json::{Map, Value};

use crate::tool::ToolKind;

/// Scalar types a tool parameter may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamType {
    /// JSON-schema type name used in the declaration sent to the model.
    pub fn json_name(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
        }
    }

    /// Whether a JSON value is acceptable for this type.
    ///
    /// Coercion is deliberately lenient where the conversion is lossless:
    /// integral floats count as integers, numeric strings count as numbers,
    /// "true"/"false" strings count as booleans.
    fn accepts(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => match value {
                Value::Number(n) => n.is_i64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
                Value::String(s) => s.trim().parse::<i64>().is_ok(),
                _ => false,
            },
            ParamType::Number => match value {
                Value::Number(_) => true,
                Value::String(s) => s.trim().parse::<f64>().is_ok(),
                _ => false,
            },
            ParamType::Boolean => match value {
                Value::Bool(_) => true,
                Value::String(s) => matches!(s.trim(), "true" | "false"),
                _ => false,
            },
        }
    }
}

/// One declared parameter of a tool.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub ty: ParamType,
    pub description: &'static str,
    pub required: bool,
}

impl ParamSpec {
    pub fn required(name: &'static str, ty: ParamType, description: &'static str) -> Self {
        Self {
            name,
            ty,
            description,
            required: true,
        }
    }

    pub fn optional(name: &'static str, ty: ParamType, description: &'static str) -> Self {
        Self {
            name,
            ty,
            description,
            required: false,
        }
    }
}

/// Immutable schema record for one tool: identifier, description, parameters.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub kind: ToolKind,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
}

impl ToolSpec {
    pub fn new(kind: ToolKind, description: &'static str) -> Self {
        Self {
            kind,
            description,
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Render as a function declaration in the shape the model API expects.
    pub fn to_declaration(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.params {
            properties.insert(
                param.name.to_string(),
                serde_json::json!({
                    "type": param.ty.json_name(),
                    "description": param.description,
                }),
            );
            if param.required {
                required.push(Value::String(param.name.to_string()));
            }
        }

        let mut parameters = serde_json::json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            parameters["required"] = Value::Array(required);
        }

        serde_json::json!({
            "name": self.name(),
            "description": self.description,
            "parameters": parameters,
        })
    }
}

/// Argument validation failure. Recoverable: it becomes an error-shaped
/// payload for the model, never a crash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgError {
    #[error("missing required parameter '{name}'")]
    Missing { name: &'static str },
    #[error("parameter '{name}' is not a valid {expected}")]
    WrongType {
        name: &'static str,
        expected: &'static str,
    },
}

/// The argument mapping a model supplies with a tool call.
///
/// Values are JSON scalars keyed by parameter name. Accessors fill gaps with
/// each tool's own defaults, so tool bodies read like their declarations.
#[derive(Debug, Clone, Default)]
pub struct ToolArgs(Map<String, Value>);

impl ToolArgs {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Build from any JSON value; non-objects become the empty mapping.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self(Map::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Check presence of required parameters and coercibility of everything
    /// supplied, against the tool's declaration.
    pub fn validate(&self, spec: &ToolSpec) -> Result<(), ArgError> {
        for param in &spec.params {
            match self.0.get(param.name) {
                None | Some(Value::Null) => {
                    if param.required {
                        return Err(ArgError::Missing { name: param.name });
                    }
                }
                Some(value) => {
                    if !param.ty.accepts(value) {
                        return Err(ArgError::WrongType {
                            name: param.name,
                            expected: param.ty.json_name(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn str_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.str(name).unwrap_or(default)
    }

    pub fn i64_or(&self, name: &str, default: i64) -> i64 {
        match self.0.get(name) {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    pub fn f64_or(&self, name: &str, default: f64) -> f64 {
        match self.0.get(name) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        match self.0.get(name) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => match s.trim() {
                "true" => true,
                "false" => false,
                _ => default,
            },
            _ => default,
        }
    }
}

impl From<Map<String, Value>> for ToolArgs {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_spec() -> ToolSpec {
        ToolSpec::new(ToolKind::ReadFileContent, "Read a file")
            .with_param(ParamSpec::required(
                "file_path",
                ParamType::String,
                "Path to the file",
            ))
            .with_param(ParamSpec::optional(
                "max_lines",
                ParamType::Integer,
                "Line cap",
            ))
    }

    fn args(json: Value) -> ToolArgs {
        ToolArgs::from_value(json)
    }

    #[test]
    fn validate_accepts_complete_args() {
        let spec = sample_spec();
        assert!(
            args(serde_json::json!({"file_path": "/tmp/x", "max_lines": 10}))
                .validate(&spec)
                .is_ok()
        );
        // Optional parameter may be absent
        assert!(
            args(serde_json::json!({"file_path": "/tmp/x"}))
                .validate(&spec)
                .is_ok()
        );
    }

    #[test]
    fn validate_rejects_missing_required() {
        let spec = sample_spec();
        let err = args(serde_json::json!({"max_lines": 10}))
            .validate(&spec)
            .unwrap_err();
        assert_eq!(err, ArgError::Missing { name: "file_path" });
    }

    #[test]
    fn validate_rejects_uncoercible_types() {
        let spec = sample_spec();
        let err = args(serde_json::json!({"file_path": "/tmp/x", "max_lines": "many"}))
            .validate(&spec)
            .unwrap_err();
        assert!(matches!(err, ArgError::WrongType { name: "max_lines", .. }));
    }

    #[test]
    fn validate_coerces_lossless_representations() {
        let spec = sample_spec();
        // Integral float and numeric string both pass as integers
        assert!(
            args(serde_json::json!({"file_path": "x", "max_lines": 10.0}))
                .validate(&spec)
                .is_ok()
        );
        assert!(
            args(serde_json::json!({"file_path": "x", "max_lines": "10"}))
                .validate(&spec)
                .is_ok()
        );
        assert!(
            args(serde_json::json!({"file_path": "x", "max_lines": 10.5}))
                .validate(&spec)
                .is_err()
        );
    }

    #[test]
    fn accessors_fill_defaults() {
        let a = args(serde_json::json!({"days_threshold": 5, "confirm": "true"}));
        assert_eq!(a.i64_or("days_threshold", 10), 5);
        assert_eq!(a.i64_or("absent", 10), 10);
        assert!(a.bool_or("confirm", false));
        assert_eq!(a.str_or("path", "."), ".");
    }

    #[test]
    fn declaration_lists_required_parameters() {
        let decl = sample_spec().to_declaration();
        assert_eq!(decl["name"], "read_file_content");
        assert_eq!(decl["parameters"]["type"], "object");
        assert_eq!(
            decl["parameters"]["required"],
            serde_json::json!(["file_path"])
        );
        assert_eq!(
            decl["parameters"]["properties"]["max_lines"]["type"],
            "integer"
        );
    }
}
