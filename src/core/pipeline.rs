use crate::config::DeployConfig;
use crate::core::context::PipelineContext;
use crate::domain::model::{StepOutcome, StepPolicy, StepReport};
use crate::utils::error::{DeployError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

/// 部署流程中的一個步驟
#[async_trait]
pub trait Step: Send + Sync {
    /// 用於標識步驟名稱
    fn name(&self) -> &str;

    fn policy(&self) -> StepPolicy {
        StepPolicy::Fatal
    }

    /// dry run 時顯示的動作
    fn describe(&self, config: &DeployConfig) -> Vec<String>;

    async fn run(&self, context: &mut PipelineContext) -> Result<()>;
}

/// dry run 計畫中的一個步驟
#[derive(Debug, Clone, Serialize)]
pub struct PlannedStep {
    pub name: String,
    pub policy: StepPolicy,
    pub actions: Vec<String>,
}

/// 一次執行的結果
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub execution_id: String,
    pub started_at: DateTime<Utc>,
    pub steps: Vec<StepReport>,
}

impl RunReport {
    pub fn executed_steps(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn tolerated_failures(&self) -> Vec<&StepReport> {
        self.steps.iter().filter(|s| s.is_tolerated()).collect()
    }

    /// 獲取執行摘要
    pub fn summary(&self) -> serde_json::Value {
        let total_duration: std::time::Duration = self.steps.iter().map(|s| s.duration).sum();

        serde_json::json!({
            "execution_id": self.execution_id,
            "started_at": self.started_at.to_rfc3339(),
            "total_steps": self.steps.len(),
            "tolerated_failures": self.tolerated_failures().len(),
            "total_duration_ms": total_duration.as_millis() as u64,
            "steps": self.steps,
        })
    }
}

/// 依序執行步驟：Fatal 失敗立即中止，BestEffort 失敗記錄後繼續
pub struct ProvisionPipeline {
    steps: Vec<Box<dyn Step>>,
}

impl ProvisionPipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn add_step(&mut self, step: Box<dyn Step>) {
        self.steps.push(step);
    }

    pub fn with_step(mut self, step: Box<dyn Step>) -> Self {
        self.add_step(step);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn plan(&self, config: &DeployConfig) -> Vec<PlannedStep> {
        self.steps
            .iter()
            .map(|step| PlannedStep {
                name: step.name().to_string(),
                policy: step.policy(),
                actions: step.describe(config),
            })
            .collect()
    }

    /// 執行所有步驟
    pub async fn execute_all(&self, context: &mut PipelineContext) -> Result<RunReport> {
        let mut report = RunReport {
            execution_id: context.execution_id.clone(),
            started_at: Utc::now(),
            steps: Vec::with_capacity(self.steps.len()),
        };

        tracing::info!(
            "🚀 Starting deployment {} ({} steps)",
            report.execution_id,
            self.steps.len()
        );

        for (index, step) in self.steps.iter().enumerate() {
            let start_time = Instant::now();
            tracing::info!("➡️ [{}/{}] {}", index + 1, self.steps.len(), step.name());

            let outcome = match step.run(context).await {
                Ok(()) => StepOutcome::Succeeded,
                Err(e) if step.policy() == StepPolicy::BestEffort => {
                    tracing::warn!(
                        step = step.name(),
                        "⚠️ Best-effort step '{}' failed and was ignored: {}",
                        step.name(),
                        e
                    );
                    StepOutcome::Tolerated {
                        error: e.to_string(),
                    }
                }
                Err(e) => {
                    tracing::error!("❌ Step '{}' failed: {}", step.name(), e);
                    return Err(DeployError::StepFailed {
                        step: step.name().to_string(),
                        source: Box::new(e),
                    });
                }
            };

            let step_report = StepReport {
                name: step.name().to_string(),
                policy: step.policy(),
                outcome,
                duration: start_time.elapsed(),
            };

            if !step_report.is_tolerated() {
                tracing::info!(
                    "✅ {} done (duration: {:?})",
                    step_report.name,
                    step_report.duration
                );
            }

            report.steps.push(step_report);
        }

        Ok(report)
    }
}

impl Default for ProvisionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CommandOutput, Invocation};
    use crate::domain::ports::CommandRunner;
    use std::sync::{Arc, Mutex};

    struct NoopRunner;

    #[async_trait]
    impl CommandRunner for NoopRunner {
        async fn run(&self, _invocation: &Invocation) -> Result<CommandOutput> {
            Ok(CommandOutput::success())
        }
    }

    struct MockStep {
        name: String,
        policy: StepPolicy,
        fail: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl MockStep {
        fn new(name: &str, log: &Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name: name.to_string(),
                policy: StepPolicy::Fatal,
                fail: false,
                log: Arc::clone(log),
            }
        }

        fn best_effort(mut self) -> Self {
            self.policy = StepPolicy::BestEffort;
            self
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }
    }

    #[async_trait]
    impl Step for MockStep {
        fn name(&self) -> &str {
            &self.name
        }

        fn policy(&self) -> StepPolicy {
            self.policy
        }

        fn describe(&self, _config: &DeployConfig) -> Vec<String> {
            vec![format!("run {}", self.name)]
        }

        async fn run(&self, _context: &mut PipelineContext) -> Result<()> {
            self.log.lock().unwrap().push(self.name.clone());
            if self.fail {
                Err(DeployError::CommandFailed {
                    step: self.name.clone(),
                    program: "mock".to_string(),
                    code: Some(4),
                    output: "mock failure".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn context() -> PipelineContext {
        PipelineContext::new(
            "test".to_string(),
            DeployConfig::default(),
            Arc::new(NoopRunner),
        )
    }

    #[test]
    fn test_steps_run_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = ProvisionPipeline::new()
            .with_step(Box::new(MockStep::new("first", &log)))
            .with_step(Box::new(MockStep::new("second", &log)))
            .with_step(Box::new(MockStep::new("third", &log)));

        let report = tokio_test::block_on(pipeline.execute_all(&mut context())).unwrap();

        assert_eq!(*log.lock().unwrap(), ["first", "second", "third"]);
        assert_eq!(report.executed_steps(), ["first", "second", "third"]);
        assert!(report.tolerated_failures().is_empty());
    }

    #[test]
    fn test_fatal_failure_stops_pipeline() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = ProvisionPipeline::new()
            .with_step(Box::new(MockStep::new("first", &log).failing()))
            .with_step(Box::new(MockStep::new("second", &log)));

        let err = tokio_test::block_on(pipeline.execute_all(&mut context())).unwrap_err();

        assert_eq!(*log.lock().unwrap(), ["first"]);
        assert_eq!(err.failed_step(), Some("first"));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_best_effort_failure_is_tolerated() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = ProvisionPipeline::new()
            .with_step(Box::new(MockStep::new("assets", &log).best_effort().failing()))
            .with_step(Box::new(MockStep::new("restart", &log)));

        let report = tokio_test::block_on(pipeline.execute_all(&mut context())).unwrap();

        assert_eq!(*log.lock().unwrap(), ["assets", "restart"]);
        let tolerated = report.tolerated_failures();
        assert_eq!(tolerated.len(), 1);
        assert_eq!(tolerated[0].name, "assets");
    }

    #[test]
    fn test_summary_and_plan() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = ProvisionPipeline::new()
            .with_step(Box::new(MockStep::new("only", &log)));

        let plan = pipeline.plan(&DeployConfig::default());
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].actions, ["run only"]);
        assert!(log.lock().unwrap().is_empty());

        let report = tokio_test::block_on(pipeline.execute_all(&mut context())).unwrap();
        let summary = report.summary();
        assert_eq!(summary["total_steps"], 1);
        assert_eq!(summary["tolerated_failures"], 0);
        assert_eq!(summary["execution_id"], "test");
        assert_eq!(summary["steps"][0]["name"], "only");
    }
}
