use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

/// 泛型引擎：依序執行 extract → transform → load
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    run_id: String,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        let run_id = chrono::Local::now().format("run-%Y%m%d-%H%M%S").to_string();
        Self { pipeline, run_id }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Runs the three stages once, short-circuiting on the first failure.
    /// Stage-level logging lives in the stages themselves; this reports
    /// progress and the final outcome.
    pub async fn run(&self) -> Result<()> {
        let started = std::time::Instant::now();
        tracing::info!("🚀 Starting the data pipeline... ({})", self.run_id);

        let records = self.pipeline.extract().await?;
        tracing::info!("Extracted {} records", records.len());

        let buffer = self.pipeline.transform(records).await?;
        tracing::info!("Transformed into {} bytes of TSV", buffer.len());

        self.pipeline.load(buffer).await?;

        tracing::info!(
            "🏁 ✅ All data pipeline processes completed successfully! ({:.2?})",
            started.elapsed()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Record, TsvBuffer};
    use crate::utils::error::PipelineError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubPipeline {
        calls: Mutex<Vec<&'static str>>,
        fail_transform: bool,
    }

    #[async_trait]
    impl Pipeline for StubPipeline {
        async fn extract(&self) -> Result<Vec<Record>> {
            self.calls.lock().unwrap().push("extract");
            let records =
                serde_json::from_value(serde_json::json!([{"id": 1, "price": 75}])).unwrap();
            Ok(records)
        }

        async fn transform(&self, _records: Vec<Record>) -> Result<TsvBuffer> {
            self.calls.lock().unwrap().push("transform");
            if self.fail_transform {
                return Err(PipelineError::ProcessingError {
                    message: "boom".to_string(),
                });
            }
            Ok(TsvBuffer::from_bytes(b"id\tprice\n1\t75\n".to_vec()))
        }

        async fn load(&self, _buffer: TsvBuffer) -> Result<()> {
            self.calls.lock().unwrap().push("load");
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_run_executes_stages_in_order() {
        let engine = EtlEngine::new(StubPipeline::default());

        engine.run().await.unwrap();

        assert_eq!(
            *engine.pipeline.calls.lock().unwrap(),
            vec!["extract", "transform", "load"]
        );
    }

    #[tokio::test]
    async fn test_transform_failure_skips_load() {
        let engine = EtlEngine::new(StubPipeline {
            fail_transform: true,
            ..Default::default()
        });

        let err = engine.run().await.unwrap_err();

        assert!(matches!(err, PipelineError::ProcessingError { .. }));
        assert_eq!(
            *engine.pipeline.calls.lock().unwrap(),
            vec!["extract", "transform"]
        );
    }

    #[test]
    fn test_run_id_is_timestamped() {
        let engine = EtlEngine::new(StubPipeline::default());
        assert!(engine.run_id().starts_with("run-"));
    }
}
