//! SoapUI project serialization. Builds the tool's project XML with the
//! original WSDL embedded verbatim in a CDATA definition cache, one test
//! suite, one test case per operation and one request step per generated
//! case. Attribute and element order is fixed so identical inputs yield
//! identical bytes.

use crate::domain::model::{AssertionKind, StructuralModel, TestCase, TestCaseSet};
use crate::utils::error::Result;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

const CONFIG_NS: &str = "http://eviware.com/soapui/config";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SOAPUI_VERSION: &str = "5.7.0";
const DEFAULT_PROJECT_NAME: &str = "Generated LLM Project";
const DEFAULT_SERVICE_NAME: &str = "MyService";
const DEFAULT_BINDING_NAME: &str = "MyBinding";
const MEMORY_WSDL: &str = "memory.wsdl";
const WSDL_CONTENT_TYPE: &str = "http://schemas.xmlsoap.org/wsdl/";

type XmlWriter = Writer<Vec<u8>>;

pub fn serialize_project(
    wsdl_text: &str,
    model: &StructuralModel,
    test_cases: &TestCaseSet,
) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let project_name = model
        .services
        .first()
        .map(|s| format!("{} Project", s.name))
        .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string());

    let mut project = BytesStart::new("con:soapui-project");
    project.push_attribute(("xmlns:con", CONFIG_NS));
    project.push_attribute(("xmlns:xsi", XSI_NS));
    project.push_attribute(("name", project_name.as_str()));
    project.push_attribute(("soapui-version", SOAPUI_VERSION));
    writer.write_event(Event::Start(project))?;

    write_interfaces(&mut writer, wsdl_text, model)?;
    write_test_suite(&mut writer, model, test_cases)?;

    writer.write_event(Event::End(BytesEnd::new("con:soapui-project")))?;

    let document = String::from_utf8(writer.into_inner())?;
    Ok(document)
}

/// One interface per distinct binding, in port order, each carrying the
/// full WSDL text in its definition cache so the testing tool can reload
/// it without a network fetch.
fn write_interfaces(writer: &mut XmlWriter, wsdl_text: &str, model: &StructuralModel) -> Result<()> {
    let mut bindings: Vec<&str> = Vec::new();
    for service in &model.services {
        for port in &service.ports {
            if !bindings.contains(&port.binding.as_str()) {
                bindings.push(&port.binding);
            }
        }
    }
    if bindings.is_empty() {
        bindings.push(DEFAULT_BINDING_NAME);
    }

    for binding in bindings {
        let mut interface = BytesStart::new("con:interface");
        interface.push_attribute(("xsi:type", "con:WsdlInterface"));
        interface.push_attribute(("name", binding));
        interface.push_attribute(("type", "wsdl"));
        interface.push_attribute(("bindingName", binding));
        interface.push_attribute(("soapVersion", "1_1"));
        interface.push_attribute(("wsaVersion", "NONE"));
        interface.push_attribute(("definition", MEMORY_WSDL));
        writer.write_event(Event::Start(interface))?;

        let mut cache = BytesStart::new("con:definitionCache");
        cache.push_attribute(("type", "TEXT"));
        cache.push_attribute(("rootPart", MEMORY_WSDL));
        writer.write_event(Event::Start(cache))?;

        writer.write_event(Event::Start(BytesStart::new("con:part")))?;
        text_element(writer, "con:url", MEMORY_WSDL)?;
        cdata_element(writer, "con:content", wsdl_text)?;
        text_element(writer, "con:type", WSDL_CONTENT_TYPE)?;
        writer.write_event(Event::End(BytesEnd::new("con:part")))?;

        writer.write_event(Event::End(BytesEnd::new("con:definitionCache")))?;
        writer.write_event(Event::End(BytesEnd::new("con:interface")))?;
    }

    Ok(())
}

fn write_test_suite(
    writer: &mut XmlWriter,
    model: &StructuralModel,
    test_cases: &TestCaseSet,
) -> Result<()> {
    let service_name = model
        .services
        .first()
        .map(|s| s.name.as_str())
        .unwrap_or(DEFAULT_SERVICE_NAME);
    let fallback_binding = model
        .services
        .iter()
        .flat_map(|s| s.ports.iter())
        .map(|p| p.binding.as_str())
        .next()
        .unwrap_or(DEFAULT_BINDING_NAME);

    let mut suite = BytesStart::new("con:testSuite");
    let suite_name = format!("{} TestSuite", service_name);
    suite.push_attribute(("name", suite_name.as_str()));
    writer.write_event(Event::Start(suite))?;

    for (operation, cases) in test_cases.iter() {
        let interface = model
            .binding_for_operation(operation)
            .unwrap_or(fallback_binding);

        let mut test_case = BytesStart::new("con:testCase");
        let case_name = format!("{} TestCase", operation);
        test_case.push_attribute(("name", case_name.as_str()));
        writer.write_event(Event::Start(test_case))?;

        for case in cases {
            write_test_step(writer, interface, operation, case)?;
        }

        writer.write_event(Event::End(BytesEnd::new("con:testCase")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("con:testSuite")))?;
    Ok(())
}

fn write_test_step(
    writer: &mut XmlWriter,
    interface: &str,
    operation: &str,
    case: &TestCase,
) -> Result<()> {
    let mut step = BytesStart::new("con:testStep");
    step.push_attribute(("type", "request"));
    step.push_attribute(("name", case.display_name.as_str()));
    writer.write_event(Event::Start(step))?;

    let mut config = BytesStart::new("con:config");
    config.push_attribute(("xsi:type", "con:RequestStep"));
    writer.write_event(Event::Start(config))?;

    text_element(writer, "con:interface", interface)?;
    text_element(writer, "con:operation", operation)?;

    writer.write_event(Event::Start(BytesStart::new("con:request")))?;
    cdata_element(writer, "con:request", &case.request_body)?;

    writer.write_event(Event::Start(BytesStart::new("con:assertions")))?;
    for assertion in &case.assertions {
        write_assertion(writer, &assertion.kind, &assertion.value)?;
    }
    writer.write_event(Event::End(BytesEnd::new("con:assertions")))?;

    writer.write_event(Event::End(BytesEnd::new("con:request")))?;
    writer.write_event(Event::End(BytesEnd::new("con:config")))?;
    writer.write_event(Event::End(BytesEnd::new("con:testStep")))?;
    Ok(())
}

/// Exhaustive mapping from assertion kind to its tool configuration
/// shape. Adding a kind extends this match at compile time.
fn write_assertion(writer: &mut XmlWriter, kind: &AssertionKind, value: &str) -> Result<()> {
    let mut assertion = BytesStart::new("con:assertion");
    assertion.push_attribute(("type", kind.as_str()));

    match kind {
        AssertionKind::ValidHttpStatusCodes => {
            writer.write_event(Event::Start(assertion))?;
            writer.write_event(Event::Start(BytesStart::new("con:configuration")))?;
            text_element(writer, "codes", value)?;
            writer.write_event(Event::End(BytesEnd::new("con:configuration")))?;
            writer.write_event(Event::End(BytesEnd::new("con:assertion")))?;
        }
        AssertionKind::XPathMatch => {
            writer.write_event(Event::Start(assertion))?;
            writer.write_event(Event::Start(BytesStart::new("con:configuration")))?;
            text_element(writer, "path", value)?;
            text_element(writer, "allowWildcards", "true")?;
            text_element(writer, "ignoreNamespaceDifferences", "true")?;
            text_element(writer, "ignoreComments", "true")?;
            writer.write_event(Event::End(BytesEnd::new("con:configuration")))?;
            writer.write_event(Event::End(BytesEnd::new("con:assertion")))?;
        }
        AssertionKind::SoapFault => {
            writer.write_event(Event::Empty(assertion))?;
        }
        AssertionKind::Other(_) => {
            writer.write_event(Event::Start(assertion))?;
            writer.write_event(Event::Empty(BytesStart::new("con:configuration")))?;
            writer.write_event(Event::End(BytesEnd::new("con:assertion")))?;
        }
    }
    Ok(())
}

fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Start, CDATA and End are written back to back so no indentation text
/// leaks into the element content; extraction stays byte-identical.
fn cdata_element(writer: &mut XmlWriter, name: &str, content: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::CData(BytesCData::new(content)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        Assertion, CaseLabel, FieldDef, Operation, Port, Service, TestCase,
    };

    fn echo_model() -> StructuralModel {
        StructuralModel {
            services: vec![Service {
                name: "EchoService".to_string(),
                ports: vec![Port {
                    name: "EchoPort".to_string(),
                    binding: "EchoBinding".to_string(),
                    operations: vec![Operation {
                        name: "Echo".to_string(),
                        soap_action: String::new(),
                        input_elements: vec![FieldDef {
                            name: "msg".to_string(),
                            type_name: "xsd:string".to_string(),
                        }],
                        output_elements: vec![],
                    }],
                }],
            }],
            target_namespace: "urn:echo".to_string(),
            error: None,
        }
    }

    fn echo_cases() -> TestCaseSet {
        let mut set = TestCaseSet::new();
        set.insert(
            "Echo",
            vec![
                TestCase {
                    label: CaseLabel::Positive,
                    display_name: "Echo happy path".to_string(),
                    request_body: "<soapenv:Envelope>ok</soapenv:Envelope>".to_string(),
                    assertions: vec![
                        Assertion {
                            kind: AssertionKind::ValidHttpStatusCodes,
                            value: "200".to_string(),
                        },
                        Assertion {
                            kind: AssertionKind::XPathMatch,
                            value: "/a/b".to_string(),
                        },
                    ],
                },
                TestCase {
                    label: CaseLabel::Negative,
                    display_name: "Echo rejects malformed body".to_string(),
                    request_body: "<soapenv:Envelope>bad</soapenv:Envelope>".to_string(),
                    assertions: vec![Assertion {
                        kind: AssertionKind::SoapFault,
                        value: String::new(),
                    }],
                },
                TestCase {
                    label: CaseLabel::Edge,
                    display_name: "Echo with empty message".to_string(),
                    request_body: "<soapenv:Envelope>edge</soapenv:Envelope>".to_string(),
                    assertions: vec![Assertion {
                        kind: AssertionKind::Other("Response SLA".to_string()),
                        value: "500".to_string(),
                    }],
                },
            ],
        );
        set
    }

    const WSDL: &str = "<wsdl:definitions name=\"Echo\">\n  <wsdl:service/>\n</wsdl:definitions>";

    fn extract_cdata(document: &str) -> &str {
        let start = document.find("<![CDATA[").unwrap() + "<![CDATA[".len();
        let end = document[start..].find("]]>").unwrap() + start;
        &document[start..end]
    }

    #[test]
    fn test_wsdl_round_trips_byte_identical() {
        let document = serialize_project(WSDL, &echo_model(), &echo_cases()).unwrap();
        assert_eq!(extract_cdata(&document), WSDL);
    }

    #[test]
    fn test_project_and_suite_names_derived_from_service() {
        let document = serialize_project(WSDL, &echo_model(), &echo_cases()).unwrap();
        assert!(document.contains("name=\"EchoService Project\""));
        assert!(document.contains("<con:testSuite name=\"EchoService TestSuite\">"));
    }

    #[test]
    fn test_interface_attributes_in_fixed_order() {
        let document = serialize_project(WSDL, &echo_model(), &echo_cases()).unwrap();
        assert!(document.contains(
            "<con:interface xsi:type=\"con:WsdlInterface\" name=\"EchoBinding\" type=\"wsdl\" \
             bindingName=\"EchoBinding\" soapVersion=\"1_1\" wsaVersion=\"NONE\" \
             definition=\"memory.wsdl\">"
        ));
    }

    #[test]
    fn test_step_names_come_from_case_display_names() {
        let document = serialize_project(WSDL, &echo_model(), &echo_cases()).unwrap();

        assert!(document.contains("<con:testStep type=\"request\" name=\"Echo happy path\">"));
        assert!(document
            .contains("<con:testStep type=\"request\" name=\"Echo rejects malformed body\">"));
        assert!(document
            .contains("<con:testStep type=\"request\" name=\"Echo with empty message\">"));
        // The default "{operation} - {label}" form is only a fallback for
        // unnamed cases and must not override a provided name.
        assert!(!document.contains("name=\"Echo - positive_case\""));
    }

    #[test]
    fn test_one_test_case_with_three_steps() {
        let document = serialize_project(WSDL, &echo_model(), &echo_cases()).unwrap();

        assert_eq!(document.matches("<con:testSuite ").count(), 1);
        assert_eq!(document.matches("<con:testCase ").count(), 1);
        assert!(document.contains("<con:testCase name=\"Echo TestCase\">"));
        assert_eq!(document.matches("<con:testStep ").count(), 3);
        assert_eq!(
            document
                .matches("<con:interface>EchoBinding</con:interface>")
                .count(),
            3
        );
        assert_eq!(
            document.matches("<con:operation>Echo</con:operation>").count(),
            3
        );
    }

    #[test]
    fn test_http_status_assertion_configuration() {
        let document = serialize_project(WSDL, &echo_model(), &echo_cases()).unwrap();
        assert!(document.contains("<con:assertion type=\"Valid HTTP Status Codes\">"));
        assert!(document.contains("<codes>200</codes>"));
    }

    #[test]
    fn test_xpath_assertion_configuration() {
        let document = serialize_project(WSDL, &echo_model(), &echo_cases()).unwrap();
        assert!(document.contains("<path>/a/b</path>"));
        assert!(document.contains("<allowWildcards>true</allowWildcards>"));
        assert!(document.contains("<ignoreNamespaceDifferences>true</ignoreNamespaceDifferences>"));
        assert!(document.contains("<ignoreComments>true</ignoreComments>"));
    }

    #[test]
    fn test_soap_fault_assertion_has_no_configuration() {
        let document = serialize_project(WSDL, &echo_model(), &echo_cases()).unwrap();
        assert!(document.contains("<con:assertion type=\"SOAP Fault\"/>"));
    }

    #[test]
    fn test_unrecognized_kind_gets_empty_configuration() {
        let document = serialize_project(WSDL, &echo_model(), &echo_cases()).unwrap();
        assert!(document
            .contains("<con:assertion type=\"Response SLA\">"));
        assert!(document.contains("<con:configuration/>"));
    }

    #[test]
    fn test_empty_model_and_cases_degrade_to_placeholders() {
        let document =
            serialize_project(WSDL, &StructuralModel::default(), &TestCaseSet::new()).unwrap();

        assert!(document.contains("name=\"Generated LLM Project\""));
        assert!(document.contains("name=\"MyBinding\""));
        assert!(document.contains("<con:testSuite name=\"MyService TestSuite\">"));
        assert_eq!(document.matches("<con:testCase ").count(), 0);
        // The WSDL is still embedded.
        assert_eq!(extract_cdata(&document), WSDL);
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let first = serialize_project(WSDL, &echo_model(), &echo_cases()).unwrap();
        let second = serialize_project(WSDL, &echo_model(), &echo_cases()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_shared_binding_emits_single_interface() {
        let mut model = echo_model();
        model.services[0].ports.push(Port {
            name: "EchoPortTwo".to_string(),
            binding: "EchoBinding".to_string(),
            operations: vec![],
        });

        let document = serialize_project(WSDL, &model, &echo_cases()).unwrap();
        assert_eq!(document.matches("<con:interface ").count(), 1);
    }
}
