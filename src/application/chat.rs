//! Question answering over the live dashboard figures.

use std::sync::Arc;

use tracing::debug;

use super::financial::FinancialService;
use super::logged;
use super::market::MarketService;
use super::sentiment::SentimentService;
use crate::domain::chat::{context_prompt, template_answer, ChatContext, Topic, SYSTEM_PROMPT};
use crate::port::Llm;

pub struct ChatService {
    market: Arc<MarketService>,
    financial: Arc<FinancialService>,
    sentiment: Arc<SentimentService>,
    llm: Option<Arc<dyn Llm>>,
}

impl ChatService {
    #[must_use]
    pub fn new(
        market: Arc<MarketService>,
        financial: Arc<FinancialService>,
        sentiment: Arc<SentimentService>,
        llm: Option<Arc<dyn Llm>>,
    ) -> Self {
        Self {
            market,
            financial,
            sentiment,
            llm,
        }
    }

    /// Answer `question`. Price, Fed and sentiment questions get a
    /// data-driven template; anything else goes to the model when one is
    /// configured.
    pub async fn ask(&self, question: &str) -> String {
        let (market, treasury, inflation, sentiment) = futures_util::join!(
            self.market.market_data(false),
            self.financial.treasury(),
            self.financial.inflation(false),
            self.sentiment.analysis()
        );
        let ctx = ChatContext::new(
            Some(&market),
            treasury.ok().as_ref(),
            Some(&inflation),
            Some(&sentiment),
        );

        let topic = Topic::classify(question);
        debug!(?topic, "Answering chat question");
        if topic != Topic::General {
            return template_answer(topic, &ctx);
        }

        if let Some(llm) = &self.llm {
            let prompt = context_prompt(question, &ctx);
            let reply = llm.complete(Some(SYSTEM_PROMPT), &prompt).await;
            if let Ok(answer) = logged("chat answer", llm.name(), reply) {
                if !answer.trim().is_empty() {
                    return answer;
                }
            }
        }
        template_answer(Topic::General, &ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::AppState;
    use crate::testkit::{self, clock::ManualClock, llm::ScriptedLlm};

    fn state(llm: Option<Arc<dyn Llm>>) -> AppState {
        let config = testkit::config::at(testkit::config::DEAD_BASE);
        AppState::with_llms(&config, Arc::new(ManualClock::default()), None, llm)
    }

    #[tokio::test]
    async fn price_question_uses_template_with_fallback_figures() {
        let answer = state(None).chat.ask("What's the bitcoin price?").await;
        assert!(answer.contains("**Current Bitcoin Price**: $41,285.34 (24h change: 2.14%)"));
        assert!(answer.contains("US 10-Year Treasury N/A"));
    }

    #[tokio::test]
    async fn fed_question_quotes_inflation_estimate() {
        let answer = state(None).chat.ask("Will the Fed cut rates?").await;
        assert!(answer.contains("2.40%"), "{answer}");
    }

    #[tokio::test]
    async fn general_question_goes_to_model() {
        let llm = Arc::new(ScriptedLlm::replying("A halving cuts the block subsidy in half."));
        let model: Arc<dyn Llm> = llm.clone();
        let answer = state(Some(model)).chat.ask("What is a halving?").await;
        assert_eq!(answer, "A halving cuts the block subsidy in half.");
        assert!(llm.prompts()[0].ends_with("User question: What is a halving?"));
    }

    #[tokio::test]
    async fn general_question_without_model_gets_overview() {
        let answer = state(None).chat.ask("Who are you?").await;
        assert!(answer.starts_with("I can help you understand"));
    }

    #[tokio::test]
    async fn failed_model_gets_overview() {
        let llm: Arc<dyn Llm> = Arc::new(ScriptedLlm::failing(500));
        let answer = state(Some(llm)).chat.ask("Who are you?").await;
        assert!(answer.starts_with("I can help you understand"));
    }
}
