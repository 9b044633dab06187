use crate::domain::model::{StructuralModel, TestCaseSet};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn ollama_base_url(&self) -> &str;
    fn model_name(&self) -> &str;
    fn request_timeout_secs(&self) -> u64;
    fn output_path(&self) -> &str;
}

/// The three pipeline stages, run in fixed order by the engine. Each
/// stage degrades internally; an `Err` here means a bug-class failure
/// that only the outermost boundary may convert into a response.
#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn introspect(&self, wsdl_text: &str) -> Result<StructuralModel>;
    async fn synthesize(
        &self,
        model: &StructuralModel,
        requirements: &str,
    ) -> Result<TestCaseSet>;
    async fn serialize(
        &self,
        wsdl_text: &str,
        model: &StructuralModel,
        test_cases: &TestCaseSet,
    ) -> Result<String>;
}
