//! Prompt templates for LLM-backed evaluation

use crate::agent::identity::AgentRole;
use crate::proposal::EvaluationContext;

/// Templates for the prompts an advisor plugin sends to its model
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt shared by every role
    pub fn evaluation_system() -> &'static str {
        r#"You are one member of a swarm of autonomous agents that must jointly approve
or reject an action before it runs on Solana. Judge only from your own role's
perspective. Answer with a single JSON object and nothing else."#
    }

    /// Role-specific focus areas
    pub fn role_prompt(role: &AgentRole) -> String {
        match role {
            AgentRole::RiskManager => r#"As a Risk Manager on Solana, evaluate this proposal focusing on:
1. Position Size Analysis
2. Smart Contract Security Assessment
3. Slippage and MEV Risk
4. Solana Network Conditions

Your primary responsibility is protecting assets and maintaining risk parameters."#
                .to_string(),
            AgentRole::MarketAnalyzer => r#"As a Market Analyzer on Solana, evaluate this proposal focusing on:
1. Token Price Analysis on Solana DEXs
2. Liquidity Conditions on Jupiter/Raydium
3. Volume and Trading Patterns
4. Cross-DEX Arbitrage Opportunities

Your primary responsibility is market analysis and trend identification."#
                .to_string(),
            AgentRole::StrategyOptimizer => r#"As a Strategy Optimizer on Solana, evaluate this proposal focusing on:
1. Transaction Cost Optimization
2. Route Optimization across Solana DEXs
3. Performance Metrics
4. MEV Protection Strategies

Your primary responsibility is optimizing execution and performance."#
                .to_string(),
            other => format!(
                "As a {}, evaluate this proposal based on your expertise.",
                other.display_name()
            ),
        }
    }

    /// Full user prompt for one evaluation
    pub fn evaluation_prompt(role: &AgentRole, context: &EvaluationContext) -> String {
        let proposal = context.proposal();
        let mut prompt = format!(
            r#"{}

Proposal to Evaluate:
Type: {}
Parameters: {}
Proposer: {}
"#,
            Self::role_prompt(role),
            proposal.action_type,
            proposal.params_pretty(),
            proposal.proposer.role,
        );

        if !context.market_context.is_empty() {
            let market = serde_json::to_string_pretty(&context.market_context)
                .unwrap_or_else(|_| "{}".to_string());
            prompt.push_str(&format!("\nMarket Context:\n{}\n", market));
        }

        prompt.push_str(
            r#"
Provide your analysis in JSON format with:
- observation: string (what you observe)
- reasoning: string (your analysis)
- conclusion: string (your recommendation)
- decision: "approve" | "reject" | "abstain"
- confidence: float (0-1)
"#,
        );
        prompt
    }
}
