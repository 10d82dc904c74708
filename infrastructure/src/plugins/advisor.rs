//! Advisor plugin: evaluation through an LLM completion
//!
//! Builds the role prompt for each proposal, sends it through the
//! [`LlmCompletion`] port and parses the reply with [`parse_assessment`].
//! Malformed replies degrade to low-confidence assessments rather than
//! errors; only transport failures are reported as [`PluginError`]s.

use super::simulated_execution;
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use swarm_application::{
    CompletionError, ExecutionError, InitializationError, LlmCompletion, Plugin, PluginError,
};
use swarm_domain::{AgentRole, Assessment, EvaluationContext, PromptTemplate, parse_assessment};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub struct AdvisorPlugin {
    role: AgentRole,
    completion: Arc<dyn LlmCompletion>,
    system_prompt: String,
}

impl AdvisorPlugin {
    pub fn new(role: AgentRole, completion: Arc<dyn LlmCompletion>) -> Self {
        Self {
            role,
            completion,
            system_prompt: PromptTemplate::evaluation_system().to_string(),
        }
    }

    /// Replace the shared evaluation system prompt
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }
}

#[async_trait]
impl Plugin for AdvisorPlugin {
    async fn initialize(&self) -> Result<(), InitializationError> {
        if self.system_prompt.trim().is_empty() {
            return Err(InitializationError::InvalidSettings(
                "system prompt must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    async fn evaluate(
        &self,
        context: &EvaluationContext,
        cancel: CancellationToken,
    ) -> Result<Assessment, PluginError> {
        let prompt = PromptTemplate::evaluation_prompt(&self.role, context);

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PluginError::Cancelled),
            response = self.completion.complete(&self.system_prompt, &prompt) => response,
        };

        let text = response.map_err(|e| {
            warn!("Completion failed for {}: {}", self.role, e);
            match e {
                CompletionError::Timeout => PluginError::Backend("completion timed out".into()),
                other => PluginError::Backend(other.to_string()),
            }
        })?;

        let assessment = parse_assessment(&text);
        debug!(
            "Advisor {} assessed {} at {:.2}",
            self.role,
            context.proposal().action_type,
            assessment.confidence
        );
        Ok(assessment)
    }

    async fn execute(
        &self,
        operation: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, ExecutionError> {
        match operation {
            "status" => Ok(json!({
                "role": self.role,
                "kind": "advisor",
            })),
            other => simulated_execution(other, params),
        }
    }

    async fn cleanup(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;
    use swarm_domain::{AgentIdentity, Decision, Proposal};

    /// Replies with canned text and remembers the prompts it saw
    struct CannedCompletion {
        reply: Result<String, CompletionError>,
        delay: Option<Duration>,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedCompletion {
        fn new(reply: Result<String, CompletionError>) -> Self {
            Self {
                reply,
                delay: None,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmCompletion for CannedCompletion {
        async fn complete(
            &self,
            _system_prompt: &str,
            prompt: &str,
        ) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.reply.clone()
        }
    }

    fn context() -> EvaluationContext {
        let mut params = Map::new();
        params.insert("input_token".into(), json!("SOL"));
        EvaluationContext::new(Proposal::new(
            "swap",
            params,
            AgentIdentity::new("decider", AgentRole::DecisionMaker),
        ))
    }

    #[tokio::test]
    async fn test_parses_model_reply() {
        let completion = Arc::new(CannedCompletion::new(Ok(r#"Sure:
{"observation": "Deep pool", "reasoning": "Slippage under 0.1%", "conclusion": "go", "confidence": 0.85, "decision": "approve"}"#
            .to_string())));
        let plugin = AdvisorPlugin::new(AgentRole::RiskManager, completion.clone());

        let assessment = plugin
            .evaluate(&context(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(assessment.confidence, 0.85);
        assert_eq!(assessment.decision, Some(Decision::Approve));

        let prompts = completion.prompts.lock().unwrap();
        assert!(prompts[0].contains("Risk Manager"));
        assert!(prompts[0].contains("SOL"));
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_low_confidence() {
        let completion = Arc::new(CannedCompletion::new(Ok("no idea".to_string())));
        let plugin = AdvisorPlugin::new(AgentRole::MarketAnalyzer, completion);

        let assessment = plugin
            .evaluate(&context(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(assessment.confidence, 0.3);
        assert!(assessment.decision.is_none());
    }

    #[tokio::test]
    async fn test_backend_failure_is_plugin_error() {
        let completion = Arc::new(CannedCompletion::new(Err(CompletionError::RequestFailed(
            "HTTP 503".into(),
        ))));
        let plugin = AdvisorPlugin::new(AgentRole::MarketAnalyzer, completion);

        let result = plugin.evaluate(&context(), CancellationToken::new()).await;
        assert!(matches!(result, Err(PluginError::Backend(msg)) if msg.contains("503")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_wins_over_slow_model() {
        let mut completion = CannedCompletion::new(Ok("{}".to_string()));
        completion.delay = Some(Duration::from_secs(120));
        let plugin = AdvisorPlugin::new(AgentRole::RiskManager, Arc::new(completion));

        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = plugin.evaluate(&context(), cancel).await;
        assert_eq!(result, Err(PluginError::Cancelled));
    }

    #[tokio::test]
    async fn test_empty_system_prompt_rejected() {
        let completion = Arc::new(CannedCompletion::new(Ok("{}".to_string())));
        let plugin =
            AdvisorPlugin::new(AgentRole::RiskManager, completion).with_system_prompt("  ");
        assert!(plugin.initialize().await.is_err());
    }
}
