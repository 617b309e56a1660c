use common_utils::xml::{XmlContent, XmlElement};
use domain_types::router_response_types::FlatFieldMap;

pub const FUNCTION_RESULT: &str = "FunctionResult";
pub const GUWID: &str = "GuWID";
pub const INFO: &str = "Info";
pub const MESSAGE: &str = "Message";
pub const ADVICE: &str = "Advice";
/// Key under which an `Advice` directly below the root is stored
pub const ADVICE_KEY: &str = "message";

/// Flatten a response document into its leaf values.
///
/// The root itself is skipped. Containers are walked in document order and
/// a repeated leaf name keeps its last value.
pub fn flatten(root: &XmlElement) -> FlatFieldMap {
    let mut fields = FlatFieldMap::new();
    for element in root.children() {
        if element.name() == ADVICE {
            fields.insert(ADVICE_KEY, element.text().unwrap_or_default());
        } else {
            flatten_into(&mut fields, element);
        }
    }
    fields
}

fn flatten_into(fields: &mut FlatFieldMap, element: &XmlElement) {
    match element.content() {
        XmlContent::Text(text) => fields.insert(element.name(), text.as_str()),
        XmlContent::Children(children) => children
            .iter()
            .for_each(|child| flatten_into(fields, child)),
    }
}

/// Status the gateway reports for a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionResult {
    Ack,
    Pending,
    Nok,
    Unknown(String),
}

impl FunctionResult {
    pub fn from_fields(fields: &FlatFieldMap) -> Self {
        fields
            .get(FUNCTION_RESULT)
            .map(Self::from)
            .unwrap_or_else(|| Self::Unknown(String::new()))
    }

    /// `PENDING` counts as success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ack | Self::Pending)
    }
}

impl From<&str> for FunctionResult {
    fn from(value: &str) -> Self {
        match value {
            "ACK" => Self::Ack,
            "PENDING" => Self::Pending,
            "NOK" => Self::Nok,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for FunctionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ack => f.write_str("ACK"),
            Self::Pending => f.write_str("PENDING"),
            Self::Nok => f.write_str("NOK"),
            Self::Unknown(value) => f.write_str(value),
        }
    }
}
