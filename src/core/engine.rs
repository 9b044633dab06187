use crate::core::Pipeline;
use crate::utils::error::Result;

/// Runs the three stages in fixed order, handing state from one stage to
/// the next by value. Introspection completes before synthesis starts,
/// synthesis before serialization; stages are never reordered or run
/// concurrently for one invocation.
pub struct GeneratorEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> GeneratorEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self, wsdl_text: &str, requirements: &str) -> Result<String> {
        tracing::info!("Parsing WSDL");
        let model = self.pipeline.introspect(wsdl_text).await?;
        if let Some(error) = &model.error {
            tracing::warn!("WSDL introspection degraded: {}", error);
        } else {
            tracing::info!(
                "Found {} operation(s) in {} service(s)",
                model.operation_count(),
                model.services.len()
            );
        }

        tracing::info!("Generating test cases");
        let test_cases = self.pipeline.synthesize(&model, requirements).await?;
        tracing::info!("Generated test cases for {} operation(s)", test_cases.len());

        tracing::info!("Serializing SoapUI project");
        let document = self
            .pipeline
            .serialize(wsdl_text, &model, &test_cases)
            .await?;
        tracing::info!("Project document ready ({} bytes)", document.len());

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{StructuralModel, TestCaseSet};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingPipeline {
        calls: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl Pipeline for RecordingPipeline {
        async fn introspect(&self, _wsdl_text: &str) -> Result<StructuralModel> {
            self.calls.lock().unwrap().push("introspect");
            Ok(StructuralModel::default())
        }

        async fn synthesize(
            &self,
            _model: &StructuralModel,
            _requirements: &str,
        ) -> Result<TestCaseSet> {
            self.calls.lock().unwrap().push("synthesize");
            Ok(TestCaseSet::new())
        }

        async fn serialize(
            &self,
            wsdl_text: &str,
            _model: &StructuralModel,
            _test_cases: &TestCaseSet,
        ) -> Result<String> {
            self.calls.lock().unwrap().push("serialize");
            Ok(format!("<project>{}</project>", wsdl_text))
        }
    }

    #[tokio::test]
    async fn test_engine_runs_stages_in_order() {
        let pipeline = RecordingPipeline {
            calls: Mutex::new(Vec::new()),
        };
        let engine = GeneratorEngine::new(pipeline);

        let document = engine.run("<wsdl/>", "reqs").await.unwrap();

        assert_eq!(document, "<project><wsdl/></project>");
        assert_eq!(
            *engine.pipeline.calls.lock().unwrap(),
            vec!["introspect", "synthesize", "serialize"]
        );
    }
}
