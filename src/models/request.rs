//! HTTP request representation
//!
//! Immutable value handed to the session action by the host tool.
//! Every `with_*` method returns a new request and leaves `self` untouched.

use serde::{Deserialize, Serialize};

/// Single HTTP header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Where a parameter lives in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParameterType {
    /// Query string parameter
    Url,
    /// Cookie
    Cookie,
    /// Form body parameter
    Body,
}

/// Typed request parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub name: String,
    pub value: String,
}

impl Parameter {
    pub fn new(kind: ParameterType, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            value: value.into(),
        }
    }
}

/// HTTP request as seen by the session action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    /// Request method
    #[serde(default = "default_method")]
    pub method: String,
    /// Request path (without query string)
    #[serde(default = "default_path")]
    pub path: String,
    /// Headers in wire order
    #[serde(default)]
    pub headers: Vec<Header>,
    /// URL, cookie and body parameters in wire order
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Raw body text
    #[serde(default)]
    pub body: String,
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_path() -> String {
    "/".to_string()
}

impl Default for HttpRequest {
    fn default() -> Self {
        Self {
            method: default_method(),
            path: default_path(),
            headers: Vec::new(),
            parameters: Vec::new(),
            body: String::new(),
        }
    }
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// Index of the first header whose name matches, ignoring ASCII case
    pub fn header_position(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.name.eq_ignore_ascii_case(name))
    }

    /// Index of the first parameter of `kind` whose name matches, ignoring ASCII case
    pub fn parameter_position(&self, kind: ParameterType, name: &str) -> Option<usize> {
        self.parameters
            .iter()
            .position(|p| p.kind == kind && p.name.eq_ignore_ascii_case(name))
    }

    /// Value of the first header matching `name`
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_position(name)
            .map(|i| self.headers[i].value.as_str())
    }

    /// Value of the first parameter of `kind` matching `name`
    pub fn parameter(&self, kind: ParameterType, name: &str) -> Option<&str> {
        self.parameter_position(kind, name)
            .map(|i| self.parameters[i].value.as_str())
    }

    pub fn with_header(&self, header: Header) -> Self {
        let mut next = self.clone();
        next.headers.push(header);
        next
    }

    /// Replace the value of the header at `index`, keeping its name and position
    pub fn with_header_value(&self, index: usize, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        if let Some(header) = next.headers.get_mut(index) {
            header.value = value.into();
        }
        next
    }

    pub fn with_parameter(&self, parameter: Parameter) -> Self {
        let mut next = self.clone();
        next.parameters.push(parameter);
        next
    }

    /// Replace the value of the parameter at `index`, keeping its name, type and position
    pub fn with_parameter_value(&self, index: usize, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        if let Some(parameter) = next.parameters.get_mut(index) {
            parameter.value = value.into();
        }
        next
    }

    pub fn with_body(&self, body: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.body = body.into();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let request = HttpRequest::new("POST", "/login")
            .with_header(Header::new("X-OTP", "1"))
            .with_parameter(Parameter::new(ParameterType::Cookie, "Session", "abc"));

        assert_eq!(request.header_position("x-otp"), Some(0));
        assert_eq!(request.parameter(ParameterType::Cookie, "session"), Some("abc"));
        // Same name under a different type does not match
        assert_eq!(request.parameter_position(ParameterType::Url, "session"), None);
    }

    #[test]
    fn test_updates_do_not_touch_original() {
        let original = HttpRequest::new("GET", "/").with_header(Header::new("A", "1"));
        let updated = original.with_header_value(0, "2").with_body("x");

        assert_eq!(original.header("A"), Some("1"));
        assert!(original.body.is_empty());
        assert_eq!(updated.header("A"), Some("2"));
        assert_eq!(updated.body, "x");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let request: HttpRequest = serde_json::from_str(
            r#"{"parameters":[{"type":"URL","name":"q","value":"1"}]}"#,
        )
        .unwrap();

        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/");
        assert_eq!(request.parameters[0].kind, ParameterType::Url);
    }
}
