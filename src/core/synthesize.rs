//! Test case synthesis: one generation-service call per WSDL operation,
//! decoded into positive/negative/edge cases. Every failure mode (transport,
//! timeout, non-success status, undecodable payload) degrades to a single
//! `error_case` for that operation; the run never aborts.

use crate::domain::model::{
    Assertion, AssertionKind, CaseLabel, Operation, StructuralModel, TestCase, TestCaseSet,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    format: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct Synthesizer {
    client: Client,
    base_url: String,
    model_name: String,
    timeout: Duration,
    fence: Regex,
}

impl Synthesizer {
    pub fn new(config: &impl ConfigProvider) -> Self {
        Self::with_settings(
            config.ollama_base_url(),
            config.model_name(),
            Duration::from_secs(config.request_timeout_secs()),
        )
    }

    pub fn with_settings(base_url: &str, model_name: &str, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model_name: model_name.to_string(),
            timeout,
            fence: Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").unwrap(),
        }
    }

    /// Queries the generation service once per operation, in model order.
    /// Returns at most one entry per operation name.
    pub async fn synthesize(&self, model: &StructuralModel, requirements: &str) -> TestCaseSet {
        let mut test_cases = TestCaseSet::new();

        if let Some(error) = &model.error {
            tracing::warn!("Skipping synthesis, structural model is degraded: {}", error);
            return test_cases;
        }

        for (_, operation) in model.operations() {
            tracing::debug!("Generating test cases for operation '{}'", operation.name);
            let prompt = self.build_prompt(&model.target_namespace, operation, requirements);

            let cases = match self.generate(&prompt).await {
                Ok(raw) => {
                    let payload = self.strip_code_fences(&raw);
                    match decode_cases(&operation.name, payload) {
                        Some(cases) => cases,
                        None => {
                            tracing::error!(
                                "Undecodable generation payload for operation '{}'",
                                operation.name
                            );
                            error_cases(&operation.name, "invalid generation payload")
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(
                        "Generation failed for operation '{}': {}",
                        operation.name,
                        e
                    );
                    error_cases(&operation.name, &e.to_string())
                }
            };

            test_cases.insert(&operation.name, cases);
        }

        test_cases
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .timeout(self.timeout)
            .json(&GenerateRequest {
                model: &self.model_name,
                prompt,
                format: "json",
                stream: false,
            })
            .send()
            .await?
            .error_for_status()?;

        let envelope: GenerateResponse = response.json().await?;
        Ok(envelope.response)
    }

    /// Some models wrap their JSON answer in a fenced code block; strip
    /// the fences before decoding.
    fn strip_code_fences<'a>(&self, raw: &'a str) -> &'a str {
        match self.fence.captures(raw) {
            Some(captures) => captures.get(1).map(|m| m.as_str()).unwrap_or(raw),
            None => raw,
        }
    }

    fn build_prompt(
        &self,
        target_namespace: &str,
        operation: &Operation,
        requirements: &str,
    ) -> String {
        let inputs = if operation.input_elements.is_empty() {
            "  (none)".to_string()
        } else {
            operation
                .input_elements
                .iter()
                .map(|f| format!("  - {}: {}", f.name, f.type_name))
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            r#"Given the following SOAP operation, generate test cases for it.

Operation: {op}
Target namespace: {tns}
SOAP action: {action}
Input elements:
{inputs}
User requirements: "{requirements}"

Return exactly one JSON object with the keys "positive_case", "negative_case" and "edge_case".
Each key must map to an object with:
  - "name": a short descriptive test name (string)
  - "request": a complete, well-formed <soapenv:Envelope>...</soapenv:Envelope> SOAP request whose body elements are qualified with the target namespace {tns}
  - "assertions": a list of {{"type", "value"}} objects

Assertion types must be chosen from "Valid HTTP Status Codes", "XPath Match" and "SOAP Fault".
The positive case must include a "Valid HTTP Status Codes" assertion with value "200" and one "XPath Match" assertion checking the response content.
The negative case must include a "SOAP Fault" assertion and a "Valid HTTP Status Codes" assertion with value "500".
The edge case must include at least a "Valid HTTP Status Codes" assertion with value "200".

Respond with the JSON object only."#,
            op = operation.name,
            tns = target_namespace,
            action = operation.soap_action,
            inputs = inputs,
            requirements = requirements,
        )
    }
}

/// Decodes the generation payload into test cases, in the fixed label
/// order positive/negative/edge. A case given as a bare string is kept
/// as a request body with no assertions (older models answer this way).
/// Returns `None` when nothing usable is present.
fn decode_cases(operation: &str, payload: &str) -> Option<Vec<TestCase>> {
    let value: Value = serde_json::from_str(payload).ok()?;
    let object = value.as_object()?;

    let mut cases = Vec::new();
    for label in CaseLabel::GENERATED {
        let Some(case_value) = object.get(label.as_str()) else {
            continue;
        };
        let default_name = format!("{} - {}", operation, label.as_str());

        match case_value {
            Value::String(request) => cases.push(TestCase {
                label,
                display_name: default_name,
                request_body: request.clone(),
                assertions: Vec::new(),
            }),
            Value::Object(map) => {
                let display_name = map
                    .get("name")
                    .and_then(Value::as_str)
                    .filter(|name| !name.trim().is_empty())
                    .map(str::to_string)
                    .unwrap_or(default_name);
                let request_body = map
                    .get("request")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let assertions = map
                    .get("assertions")
                    .and_then(Value::as_array)
                    .map(|list| list.iter().filter_map(decode_assertion).collect())
                    .unwrap_or_default();

                cases.push(TestCase {
                    label,
                    display_name,
                    request_body,
                    assertions,
                });
            }
            _ => {}
        }
    }

    if cases.is_empty() {
        None
    } else {
        Some(cases)
    }
}

/// An assertion with an empty or missing type is dropped here, so it can
/// never reach the serializer.
fn decode_assertion(value: &Value) -> Option<Assertion> {
    let map = value.as_object()?;
    let kind = AssertionKind::parse(map.get("type").and_then(Value::as_str).unwrap_or(""))?;
    let value = map
        .get("value")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some(Assertion { kind, value })
}

fn error_cases(operation: &str, reason: &str) -> Vec<TestCase> {
    vec![TestCase {
        label: CaseLabel::Error,
        display_name: format!("{} - error_case", operation),
        request_body: format!("<error>Could not generate test case: {}</error>", reason),
        assertions: Vec::new(),
    }]
}
