use crate::core::introspect::parse_wsdl;
use crate::core::serialize::serialize_project;
use crate::core::synthesize::Synthesizer;
use crate::core::{ConfigProvider, Pipeline};
use crate::domain::model::{StructuralModel, TestCaseSet};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Production pipeline: quick-xml introspection, Ollama-backed synthesis,
/// SoapUI project serialization.
pub struct TestGenPipeline {
    synthesizer: Synthesizer,
}

impl TestGenPipeline {
    pub fn new(config: &impl ConfigProvider) -> Self {
        Self {
            synthesizer: Synthesizer::new(config),
        }
    }
}

#[async_trait]
impl Pipeline for TestGenPipeline {
    async fn introspect(&self, wsdl_text: &str) -> Result<StructuralModel> {
        Ok(parse_wsdl(wsdl_text))
    }

    async fn synthesize(
        &self,
        model: &StructuralModel,
        requirements: &str,
    ) -> Result<TestCaseSet> {
        Ok(self.synthesizer.synthesize(model, requirements).await)
    }

    async fn serialize(
        &self,
        wsdl_text: &str,
        model: &StructuralModel,
        test_cases: &TestCaseSet,
    ) -> Result<String> {
        serialize_project(wsdl_text, model, test_cases)
    }
}
