//! WSDL introspection: a single streaming pass over the document collects
//! schema elements, messages, portTypes, bindings and services, then an
//! assembly step resolves ports through their bindings down to flattened
//! input/output field lists.
//!
//! The document is treated as self-contained; imports are never fetched.
//! Any failure is folded into `StructuralModel::error` so the pipeline
//! can continue with an empty model.

use crate::domain::model::{FieldDef, Operation, Port, Service, StructuralModel};
use crate::utils::error::Result;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

pub fn parse_wsdl(wsdl_text: &str) -> StructuralModel {
    match parse_inner(wsdl_text) {
        Ok(model) => model,
        Err(e) => {
            tracing::error!("WSDL parse failed: {}", e);
            StructuralModel::from_error(format!("WSDL parse error: {}", e))
        }
    }
}

fn local_part(qname: &str) -> &str {
    qname.rsplit(':').next().unwrap_or(qname)
}

fn prefix_part(qname: &str) -> Option<&str> {
    let mut split = qname.splitn(2, ':');
    let first = split.next()?;
    split.next().map(|_| first)
}

fn get_attrs<const N: usize>(start: &BytesStart, names: [&str; N]) -> Result<[Option<String>; N]> {
    const INIT: Option<String> = None;
    let mut result = [INIT; N];

    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();

        for (index, name) in names.iter().enumerate() {
            if key == *name {
                result[index] = Some(attribute.unescape_value()?.into_owned());
                break;
            }
        }
    }

    Ok(result)
}

#[derive(Debug, Default)]
struct RawElement {
    type_ref: Option<String>,
    fields: Vec<FieldDef>,
}

#[derive(Debug)]
struct RawPart {
    name: String,
    element: Option<String>,
    type_ref: Option<String>,
}

#[derive(Debug)]
struct RawPortTypeOp {
    name: String,
    input: Option<String>,
    output: Option<String>,
}

#[derive(Debug, Default)]
struct RawBinding {
    port_type: Option<String>,
    operations: Vec<(String, String)>,
}

#[derive(Debug)]
struct RawPort {
    name: String,
    binding_prefix: Option<String>,
    binding_local: String,
}

#[derive(Debug)]
struct RawService {
    name: String,
    ports: Vec<RawPort>,
}

/// Everything collected during the streaming pass, keyed by local name.
#[derive(Default)]
struct Collector {
    saw_definitions: bool,
    definitions_tns: String,
    prefixes: HashMap<String, String>,

    elements: HashMap<String, RawElement>,
    complex_types: HashMap<String, Vec<FieldDef>>,
    messages: HashMap<String, Vec<RawPart>>,
    port_types: HashMap<String, Vec<RawPortTypeOp>>,
    bindings: HashMap<String, RawBinding>,
    services: Vec<RawService>,

    path: Vec<String>,
    sequence_depth: usize,

    current_element: Option<(String, RawElement)>,
    current_type: Option<(String, Vec<FieldDef>)>,
    current_message: Option<(String, Vec<RawPart>)>,
    current_port_type: Option<(String, Vec<RawPortTypeOp>)>,
    current_pt_op: Option<RawPortTypeOp>,
    current_binding: Option<(String, RawBinding)>,
    current_binding_op: Option<(String, String)>,
    current_service: Option<RawService>,
}

impl Collector {
    fn parent(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    fn collect_namespaces(&mut self, start: &BytesStart) -> Result<()> {
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            if let Some(prefix) = key.strip_prefix("xmlns:") {
                self.prefixes
                    .insert(prefix.to_string(), attribute.unescape_value()?.into_owned());
            } else if key == "xmlns" {
                self.prefixes
                    .insert(String::new(), attribute.unescape_value()?.into_owned());
            }
        }
        Ok(())
    }

    /// Where fields found inside a top-level `sequence` should land: a
    /// named complexType if one is open, otherwise the inline type of
    /// the current global element.
    fn field_sink(&mut self) -> Option<&mut Vec<FieldDef>> {
        if let Some((_, fields)) = self.current_type.as_mut() {
            return Some(fields);
        }
        if let Some((_, element)) = self.current_element.as_mut() {
            return Some(&mut element.fields);
        }
        None
    }

    fn handle_start(&mut self, local: &str, start: &BytesStart) -> Result<()> {
        match local {
            "definitions" => {
                self.saw_definitions = true;
                let [tns] = get_attrs(start, ["targetNamespace"])?;
                self.definitions_tns = tns.unwrap_or_default();
            }

            "sequence" => self.sequence_depth += 1,

            "element" => match self.parent() {
                Some("schema") => {
                    let [name, ty] = get_attrs(start, ["name", "type"])?;
                    if let Some(name) = name {
                        self.current_element = Some((
                            name,
                            RawElement {
                                type_ref: ty,
                                fields: Vec::new(),
                            },
                        ));
                    }
                }
                Some("sequence") if self.sequence_depth == 1 => {
                    let [name, ty] = get_attrs(start, ["name", "type"])?;
                    if let (Some(name), Some(sink)) = (name, self.field_sink()) {
                        sink.push(FieldDef {
                            name,
                            type_name: ty.unwrap_or_else(|| "complexType".to_string()),
                        });
                    }
                }
                // Deeper nesting keeps its declared type name only.
                _ => {}
            },

            "complexType" => {
                if self.parent() == Some("schema") {
                    let [name] = get_attrs(start, ["name"])?;
                    if let Some(name) = name {
                        self.current_type = Some((name, Vec::new()));
                    }
                }
            }

            "message" => {
                let [name] = get_attrs(start, ["name"])?;
                if let Some(name) = name {
                    self.current_message = Some((name, Vec::new()));
                }
            }

            "part" => {
                if let Some((_, parts)) = self.current_message.as_mut() {
                    let [name, element, ty] = get_attrs(start, ["name", "element", "type"])?;
                    if let Some(name) = name {
                        parts.push(RawPart {
                            name,
                            element,
                            type_ref: ty,
                        });
                    }
                }
            }

            "portType" => {
                let [name] = get_attrs(start, ["name"])?;
                if let Some(name) = name {
                    self.current_port_type = Some((name, Vec::new()));
                }
            }

            "operation" => match self.parent() {
                Some("portType") => {
                    let [name] = get_attrs(start, ["name"])?;
                    if let Some(name) = name {
                        self.current_pt_op = Some(RawPortTypeOp {
                            name,
                            input: None,
                            output: None,
                        });
                    }
                }
                Some("binding") => {
                    let [name] = get_attrs(start, ["name"])?;
                    if let Some(name) = name {
                        self.current_binding_op = Some((name, String::new()));
                    }
                }
                // soap:operation inside a binding operation carries the action.
                Some("operation") => {
                    if let Some((_, action)) = self.current_binding_op.as_mut() {
                        let [soap_action] = get_attrs(start, ["soapAction"])?;
                        if let Some(soap_action) = soap_action {
                            *action = soap_action;
                        }
                    }
                }
                _ => {}
            },

            "input" | "output" => {
                if self.parent() == Some("operation") {
                    if let Some(op) = self.current_pt_op.as_mut() {
                        let [message] = get_attrs(start, ["message"])?;
                        let message = message.map(|m| local_part(&m).to_string());
                        if local == "input" {
                            op.input = message;
                        } else {
                            op.output = message;
                        }
                    }
                }
            }

            "binding" => {
                if self.parent() == Some("definitions") {
                    let [name, ty] = get_attrs(start, ["name", "type"])?;
                    if let Some(name) = name {
                        self.current_binding = Some((
                            name,
                            RawBinding {
                                port_type: ty.map(|t| local_part(&t).to_string()),
                                operations: Vec::new(),
                            },
                        ));
                    }
                }
                // Nested soap:binding (style/transport) is not needed here.
            }

            "service" => {
                let [name] = get_attrs(start, ["name"])?;
                if let Some(name) = name {
                    self.current_service = Some(RawService {
                        name,
                        ports: Vec::new(),
                    });
                }
            }

            "port" => {
                if let Some(service) = self.current_service.as_mut() {
                    let [name, binding] = get_attrs(start, ["name", "binding"])?;
                    if let (Some(name), Some(binding)) = (name, binding) {
                        service.ports.push(RawPort {
                            name,
                            binding_prefix: prefix_part(&binding).map(str::to_string),
                            binding_local: local_part(&binding).to_string(),
                        });
                    }
                }
            }

            _ => {}
        }

        Ok(())
    }

    fn handle_end(&mut self, local: &str) {
        match local {
            "sequence" => self.sequence_depth = self.sequence_depth.saturating_sub(1),

            "element" => {
                if self.parent() == Some("schema") {
                    if let Some((name, element)) = self.current_element.take() {
                        self.elements.insert(name, element);
                    }
                }
            }

            "complexType" => {
                if self.parent() == Some("schema") {
                    if let Some((name, fields)) = self.current_type.take() {
                        self.complex_types.insert(name, fields);
                    }
                }
            }

            "message" => {
                if let Some((name, parts)) = self.current_message.take() {
                    self.messages.insert(name, parts);
                }
            }

            "operation" => match self.parent() {
                Some("portType") => {
                    if let (Some(op), Some((_, ops))) =
                        (self.current_pt_op.take(), self.current_port_type.as_mut())
                    {
                        ops.push(op);
                    }
                }
                Some("binding") => {
                    if let (Some(op), Some((_, binding))) =
                        (self.current_binding_op.take(), self.current_binding.as_mut())
                    {
                        binding.operations.push(op);
                    }
                }
                _ => {}
            },

            "portType" => {
                if let Some((name, ops)) = self.current_port_type.take() {
                    self.port_types.insert(name, ops);
                }
            }

            "binding" => {
                if self.parent() == Some("definitions") {
                    if let Some((name, binding)) = self.current_binding.take() {
                        self.bindings.insert(name, binding);
                    }
                }
            }

            "service" => {
                if let Some(service) = self.current_service.take() {
                    self.services.push(service);
                }
            }

            _ => {}
        }
    }

    /// One-level flattening of a message into a field list. A part whose
    /// element resolves to a global element with a sequence-typed shape
    /// expands into that sequence's fields; anything else stays as a
    /// single field naming its declared type.
    fn message_fields(&self, message: Option<&str>) -> Vec<FieldDef> {
        let Some(parts) = message.and_then(|m| self.messages.get(m)) else {
            return Vec::new();
        };

        let mut fields = Vec::new();
        for part in parts {
            if let Some(element_ref) = &part.element {
                let element_local = local_part(element_ref);
                match self.elements.get(element_local) {
                    Some(element) => {
                        if !element.fields.is_empty() {
                            fields.extend(element.fields.iter().cloned());
                        } else if let Some(type_ref) = &element.type_ref {
                            match self.complex_types.get(local_part(type_ref)) {
                                Some(type_fields) if !type_fields.is_empty() => {
                                    fields.extend(type_fields.iter().cloned());
                                }
                                _ => fields.push(FieldDef {
                                    name: element_local.to_string(),
                                    type_name: type_ref.clone(),
                                }),
                            }
                        } else {
                            fields.push(FieldDef {
                                name: element_local.to_string(),
                                type_name: "element".to_string(),
                            });
                        }
                    }
                    None => fields.push(FieldDef {
                        name: part.name.clone(),
                        type_name: element_local.to_string(),
                    }),
                }
            } else if let Some(type_ref) = &part.type_ref {
                match self.complex_types.get(local_part(type_ref)) {
                    Some(type_fields) if !type_fields.is_empty() => {
                        fields.extend(type_fields.iter().cloned());
                    }
                    _ => fields.push(FieldDef {
                        name: part.name.clone(),
                        type_name: type_ref.clone(),
                    }),
                }
            }
        }
        fields
    }

    fn assemble(self) -> StructuralModel {
        let mut target_namespace = String::new();
        let mut services = Vec::new();

        for raw_service in &self.services {
            let mut ports = Vec::new();

            for raw_port in &raw_service.ports {
                // The first binding namespace observed fixes the model's
                // target namespace.
                if target_namespace.is_empty() {
                    if let Some(ns) = raw_port
                        .binding_prefix
                        .as_deref()
                        .and_then(|p| self.prefixes.get(p))
                    {
                        target_namespace = ns.clone();
                    }
                }

                let operations = match self.bindings.get(&raw_port.binding_local) {
                    Some(binding) => {
                        let port_type_ops = binding
                            .port_type
                            .as_deref()
                            .and_then(|pt| self.port_types.get(pt));

                        binding
                            .operations
                            .iter()
                            .map(|(op_name, soap_action)| {
                                let pt_op = port_type_ops
                                    .and_then(|ops| ops.iter().find(|op| op.name == *op_name));

                                Operation {
                                    name: op_name.clone(),
                                    soap_action: soap_action.clone(),
                                    input_elements: self
                                        .message_fields(pt_op.and_then(|op| op.input.as_deref())),
                                    output_elements: self
                                        .message_fields(pt_op.and_then(|op| op.output.as_deref())),
                                }
                            })
                            .collect()
                    }
                    None => {
                        tracing::warn!(
                            "Port '{}' references unknown binding '{}', recording no operations",
                            raw_port.name,
                            raw_port.binding_local
                        );
                        Vec::new()
                    }
                };

                ports.push(Port {
                    name: raw_port.name.clone(),
                    binding: raw_port.binding_local.clone(),
                    operations,
                });
            }

            services.push(Service {
                name: raw_service.name.clone(),
                ports,
            });
        }

        if target_namespace.is_empty() {
            target_namespace = self.definitions_tns.clone();
        }

        StructuralModel {
            services,
            target_namespace,
            error: None,
        }
    }
}

fn parse_inner(wsdl_text: &str) -> Result<StructuralModel> {
    let mut reader = Reader::from_str(wsdl_text);
    reader.config_mut().trim_text(true);

    let mut collector = Collector::default();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let local = String::from_utf8_lossy(start.name().local_name().as_ref()).into_owned();
                collector.collect_namespaces(&start)?;
                collector.handle_start(&local, &start)?;
                collector.path.push(local);
            }
            Event::Empty(start) => {
                let local = String::from_utf8_lossy(start.name().local_name().as_ref()).into_owned();
                collector.collect_namespaces(&start)?;
                collector.handle_start(&local, &start)?;
                collector.handle_end(&local);
            }
            Event::End(_) => {
                if let Some(local) = collector.path.pop() {
                    collector.handle_end(&local);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !collector.saw_definitions {
        return Ok(StructuralModel::from_error(
            "Not a WSDL document: no definitions element found",
        ));
    }

    let model = collector.assemble();
    tracing::debug!(
        "Parsed WSDL: {} service(s), {} operation(s), target namespace '{}'",
        model.services.len(),
        model.operation_count(),
        model.target_namespace
    );
    Ok(model)
}
