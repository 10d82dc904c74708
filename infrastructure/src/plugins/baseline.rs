//! Baseline plugin: evaluation without a model
//!
//! Reports the same confidence for every proposal, with reasoning naming the
//! agent's role. The decision is left to the runtime, which derives it from
//! the confidence and the agent's `min_confidence`.

use super::simulated_execution;
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use swarm_application::{ExecutionError, InitializationError, Plugin, PluginError};
use swarm_domain::{AgentRole, Assessment, EvaluationContext};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Confidence reported when none is configured
pub const DEFAULT_BASELINE_CONFIDENCE: f64 = 0.6;

pub struct BaselinePlugin {
    role: AgentRole,
    confidence: f64,
    latency: Option<Duration>,
    initialized: AtomicBool,
    evaluations: AtomicU64,
}

impl BaselinePlugin {
    pub fn new(role: AgentRole) -> Self {
        Self {
            role,
            confidence: DEFAULT_BASELINE_CONFIDENCE,
            latency: None,
            initialized: AtomicBool::new(false),
            evaluations: AtomicU64::new(0),
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Simulated think time before each evaluation
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn focus(&self) -> &'static str {
        match self.role {
            AgentRole::RiskManager => "position size and contract risk",
            AgentRole::MarketAnalyzer => "price and liquidity conditions",
            AgentRole::StrategyOptimizer => "execution cost and routing",
            AgentRole::DecisionMaker => "overall fit with the strategy",
            AgentRole::PortfolioManager => "portfolio allocation",
            _ => "general suitability",
        }
    }
}

#[async_trait]
impl Plugin for BaselinePlugin {
    async fn initialize(&self) -> Result<(), InitializationError> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(InitializationError::InvalidSettings(format!(
                "confidence must be between 0 and 1 (got {})",
                self.confidence
            )));
        }
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn evaluate(
        &self,
        context: &EvaluationContext,
        cancel: CancellationToken,
    ) -> Result<Assessment, PluginError> {
        if let Some(latency) = self.latency {
            tokio::select! {
                _ = cancel.cancelled() => return Err(PluginError::Cancelled),
                _ = tokio::time::sleep(latency) => {}
            }
        }
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        debug!(
            "Baseline {} evaluating {}",
            self.role,
            context.proposal().action_type
        );

        Ok(Assessment::scored(
            self.confidence,
            format!(
                "Basic evaluation without LLM for {}: {} of '{}' not analysed in depth",
                self.role.display_name(),
                self.focus(),
                context.proposal().action_type
            ),
        ))
    }

    async fn execute(
        &self,
        operation: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, ExecutionError> {
        match operation {
            "status" => Ok(json!({
                "role": self.role,
                "kind": "baseline",
                "initialized": self.initialized.load(Ordering::SeqCst),
                "confidence": self.confidence,
                "evaluations": self.evaluations.load(Ordering::Relaxed),
            })),
            other => simulated_execution(other, params),
        }
    }

    async fn cleanup(&self) {
        self.initialized.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_domain::{AgentIdentity, Decision, Proposal};

    fn context() -> EvaluationContext {
        EvaluationContext::new(Proposal::new(
            "swap",
            Map::new(),
            AgentIdentity::new("decider", AgentRole::DecisionMaker),
        ))
    }

    #[tokio::test]
    async fn test_default_confidence_abstains_under_default_threshold() {
        let plugin = BaselinePlugin::new(AgentRole::RiskManager);
        plugin.initialize().await.unwrap();

        let assessment = plugin
            .evaluate(&context(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(assessment.confidence, 0.6);
        assert!(assessment.decision.is_none());
        assert!(assessment.reasoning.contains("Risk Manager"));

        let decision = assessment.into_decision("risk".into(), 0.7);
        assert_eq!(decision.decision, Decision::Abstain);
    }

    #[tokio::test]
    async fn test_invalid_confidence_fails_init() {
        let plugin = BaselinePlugin::new(AgentRole::RiskManager).with_confidence(1.5);
        assert!(matches!(
            plugin.initialize().await,
            Err(InitializationError::InvalidSettings(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_honours_cancellation() {
        let plugin = BaselinePlugin::new(AgentRole::MarketAnalyzer)
            .with_latency(Duration::from_secs(30));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let start = tokio::time::Instant::now();
        let result = plugin.evaluate(&context(), cancel).await;
        assert_eq!(result, Err(PluginError::Cancelled));
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_execute_status_and_simulated() {
        let plugin = BaselinePlugin::new(AgentRole::RiskManager);
        plugin.initialize().await.unwrap();

        let status = plugin.execute("status", &Map::new()).await.unwrap();
        assert_eq!(status["role"], "risk_manager");
        assert_eq!(status["initialized"], true);

        let mut params = Map::new();
        params.insert("amount".into(), json!(2));
        let result = plugin.execute("swap", &params).await.unwrap();
        assert_eq!(result["status"], "simulated");
        assert_eq!(result["operation"], "swap");
        assert_eq!(result["params"]["amount"], 2);

        assert!(matches!(
            plugin.execute("", &Map::new()).await,
            Err(ExecutionError::InvalidParams(_))
        ));

        plugin.cleanup().await;
        let status = plugin.execute("status", &Map::new()).await.unwrap();
        assert_eq!(status["initialized"], false);
    }
}
