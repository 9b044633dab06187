use serde::{Deserialize, Serialize};

/// Structural model extracted from a WSDL document: services, ports,
/// operations and their flattened input/output fields.
///
/// A parse failure never escapes the introspector; it is folded into
/// `error` and the model degrades to "no operations".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuralModel {
    pub services: Vec<Service>,
    pub target_namespace: String,
    pub error: Option<String>,
}

impl StructuralModel {
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            services: Vec::new(),
            target_namespace: String::new(),
            error: Some(message.into()),
        }
    }

    /// Operations in stored order, paired with the port that owns them.
    pub fn operations(&self) -> impl Iterator<Item = (&Port, &Operation)> {
        self.services
            .iter()
            .flat_map(|s| s.ports.iter())
            .flat_map(|p| p.operations.iter().map(move |op| (p, op)))
    }

    pub fn operation_count(&self) -> usize {
        self.operations().count()
    }

    /// Binding local name of the port declaring `operation`, if any.
    pub fn binding_for_operation(&self, operation: &str) -> Option<&str> {
        self.operations()
            .find(|(_, op)| op.name == operation)
            .map(|(port, _)| port.binding.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub ports: Vec<Port>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    /// Local name of the binding this port references.
    pub binding: String,
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    /// Empty when the binding declares no soapAction.
    pub soap_action: String,
    pub input_elements: Vec<FieldDef>,
    pub output_elements: Vec<FieldDef>,
}

/// A named field with a human-readable type descriptor. Nested complex
/// types are flattened one level; anything deeper keeps its declared
/// type name only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub type_name: String,
}

/// Label of a generated test case. The three regular labels come back
/// from the generation service; `Error` is the local fallback when a
/// generation call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseLabel {
    Positive,
    Negative,
    Edge,
    Error,
}

impl CaseLabel {
    pub const GENERATED: [CaseLabel; 3] = [CaseLabel::Positive, CaseLabel::Negative, CaseLabel::Edge];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseLabel::Positive => "positive_case",
            CaseLabel::Negative => "negative_case",
            CaseLabel::Edge => "edge_case",
            CaseLabel::Error => "error_case",
        }
    }
}

/// Closed set of assertion kinds the project serializer knows how to
/// configure. Unrecognized tags are carried through as `Other` and
/// emitted with an empty configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssertionKind {
    ValidHttpStatusCodes,
    XPathMatch,
    SoapFault,
    Other(String),
}

impl AssertionKind {
    /// Maps a raw assertion tag to its kind. An empty tag yields `None`;
    /// such assertions are dropped entirely.
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        if tag.is_empty() {
            return None;
        }
        Some(match tag {
            "Valid HTTP Status Codes" => AssertionKind::ValidHttpStatusCodes,
            "XPath Match" => AssertionKind::XPathMatch,
            "SOAP Fault" => AssertionKind::SoapFault,
            other => AssertionKind::Other(other.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            AssertionKind::ValidHttpStatusCodes => "Valid HTTP Status Codes",
            AssertionKind::XPathMatch => "XPath Match",
            AssertionKind::SoapFault => "SOAP Fault",
            AssertionKind::Other(tag) => tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assertion {
    pub kind: AssertionKind,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub label: CaseLabel,
    pub display_name: String,
    /// Complete SOAP envelope (or error placeholder); never empty.
    pub request_body: String,
    pub assertions: Vec<Assertion>,
}

/// Test cases keyed by operation name, kept in the order operations were
/// synthesized. A second insert for the same operation replaces the first
/// (operation-name collisions silently merge; known limitation).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestCaseSet {
    entries: Vec<(String, Vec<TestCase>)>,
}

impl TestCaseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, operation: impl Into<String>, cases: Vec<TestCase>) {
        let operation = operation.into();
        if let Some(entry) = self.entries.iter_mut().find(|(name, _)| *name == operation) {
            entry.1 = cases;
        } else {
            self.entries.push((operation, cases));
        }
    }

    pub fn get(&self, operation: &str) -> Option<&[TestCase]> {
        self.entries
            .iter()
            .find(|(name, _)| name == operation)
            .map(|(_, cases)| cases.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TestCase])> {
        self.entries
            .iter()
            .map(|(name, cases)| (name.as_str(), cases.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_kind_parse_known_tags() {
        assert_eq!(
            AssertionKind::parse("Valid HTTP Status Codes"),
            Some(AssertionKind::ValidHttpStatusCodes)
        );
        assert_eq!(AssertionKind::parse("XPath Match"), Some(AssertionKind::XPathMatch));
        assert_eq!(AssertionKind::parse("SOAP Fault"), Some(AssertionKind::SoapFault));
    }

    #[test]
    fn test_assertion_kind_parse_empty_is_none() {
        assert_eq!(AssertionKind::parse(""), None);
        assert_eq!(AssertionKind::parse("   "), None);
    }

    #[test]
    fn test_assertion_kind_parse_unknown_is_other() {
        assert_eq!(
            AssertionKind::parse("Response SLA"),
            Some(AssertionKind::Other("Response SLA".to_string()))
        );
    }

    #[test]
    fn test_test_case_set_insert_replaces_same_operation() {
        let mut set = TestCaseSet::new();
        set.insert(
            "Echo",
            vec![TestCase {
                label: CaseLabel::Positive,
                display_name: "first".to_string(),
                request_body: "<a/>".to_string(),
                assertions: vec![],
            }],
        );
        set.insert(
            "Echo",
            vec![TestCase {
                label: CaseLabel::Error,
                display_name: "second".to_string(),
                request_body: "<b/>".to_string(),
                assertions: vec![],
            }],
        );

        assert_eq!(set.len(), 1);
        assert_eq!(set.get("Echo").unwrap()[0].display_name, "second");
    }

    #[test]
    fn test_test_case_set_preserves_insertion_order() {
        let mut set = TestCaseSet::new();
        for name in ["C", "A", "B"] {
            set.insert(name, vec![]);
        }
        let order: Vec<&str> = set.iter().map(|(name, _)| name).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_model_operations_iterate_in_stored_order() {
        let model = StructuralModel {
            services: vec![Service {
                name: "S".to_string(),
                ports: vec![Port {
                    name: "P".to_string(),
                    binding: "B".to_string(),
                    operations: vec![
                        Operation {
                            name: "First".to_string(),
                            soap_action: String::new(),
                            input_elements: vec![],
                            output_elements: vec![],
                        },
                        Operation {
                            name: "Second".to_string(),
                            soap_action: String::new(),
                            input_elements: vec![],
                            output_elements: vec![],
                        },
                    ],
                }],
            }],
            target_namespace: "urn:test".to_string(),
            error: None,
        };

        let names: Vec<&str> = model.operations().map(|(_, op)| op.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert_eq!(model.binding_for_operation("Second"), Some("B"));
        assert_eq!(model.binding_for_operation("Missing"), None);
    }
}
