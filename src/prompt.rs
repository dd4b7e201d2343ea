//! Completion Request Builder.
//!
//! Produces one of three mutually exclusive payload shapes:
//!
//! - [`PromptShape::Plain`]: the user message as-is.
//! - [`PromptShape::SnippetEnriched`]: question plus web snippets, wrapped in
//!   directives that demand the concrete answer first and forbid hedging.
//! - [`PromptShape::SearchUnavailable`]: live data was needed but nothing was
//!   found; asks for transparency, a search suggestion and caveated general
//!   knowledge instead of a refusal.
//!
//! Every shape is preceded by the most recent history exchanges, oldest
//! first, each expanded to a user turn and an assistant turn.

use crate::config::HeuristicsConfig;
use crate::history::ConversationEntry;
use crate::llm::Message;

/// Which payload shape was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptShape {
    /// No live data needed.
    Plain,
    /// Live data found and embedded.
    SnippetEnriched,
    /// Live data needed but unavailable.
    SearchUnavailable,
}

/// The final user turn before serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedPrompt {
    /// What the user asked.
    pub user_question: String,
    /// Aggregated web text, if any.
    pub snippet_block: Option<String>,
    /// Instructions appended for the model. Empty for plain prompts.
    pub directive: String,
}

impl EnrichedPrompt {
    /// The text sent as the final user message.
    pub fn render(&self) -> String {
        match (&self.snippet_block, self.directive.is_empty()) {
            (_, true) => self.user_question.clone(),
            (Some(snippets), false) => format!(
                "PERGUNTA DO USUÁRIO: {}\n\nDADOS ENCONTRADOS NA WEB:\n{}\n\n{}",
                self.user_question, snippets, self.directive
            ),
            (None, false) => format!(
                "PERGUNTA DO USUÁRIO: {}\n\n{}",
                self.user_question, self.directive
            ),
        }
    }
}

/// What gets sent to the completion service.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPayload {
    /// Chosen shape.
    pub shape: PromptShape,
    /// The final user turn.
    pub prompt: EnrichedPrompt,
    /// History turns followed by the final user turn.
    pub messages: Vec<Message>,
}

/// Builds [`PromptPayload`]s.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    hedge_phrases: Vec<String>,
}

impl PromptBuilder {
    /// Builder forbidding the configured hedge phrases.
    pub fn new(heuristics: &HeuristicsConfig) -> Self {
        Self {
            hedge_phrases: heuristics.hedge_phrases.clone(),
        }
    }

    /// Assemble the payload.
    ///
    /// `context` holds the past exchanges to replay, oldest first, as
    /// returned by [`HistoryStore::context_window`].
    ///
    /// [`HistoryStore::context_window`]: crate::history::HistoryStore::context_window
    pub fn build(
        &self,
        user_message: &str,
        snippet: Option<&str>,
        needs_live_data: bool,
        context: &[ConversationEntry],
    ) -> PromptPayload {
        let snippet = snippet.map(str::trim).filter(|s| !s.is_empty());
        let (shape, prompt) = match snippet {
            Some(snippets) => (
                PromptShape::SnippetEnriched,
                EnrichedPrompt {
                    user_question: user_message.to_owned(),
                    snippet_block: Some(snippets.to_owned()),
                    directive: self.snippet_directive(),
                },
            ),
            None if needs_live_data => (
                PromptShape::SearchUnavailable,
                EnrichedPrompt {
                    user_question: user_message.to_owned(),
                    snippet_block: None,
                    directive: unavailable_directive(user_message),
                },
            ),
            None => (
                PromptShape::Plain,
                EnrichedPrompt {
                    user_question: user_message.to_owned(),
                    snippet_block: None,
                    directive: String::new(),
                },
            ),
        };

        let mut messages: Vec<Message> = context
            .iter()
            .flat_map(|e| [Message::user(&e.user), Message::assistant(&e.assistant)])
            .collect();
        messages.push(Message::user(prompt.render()));

        tracing::debug!(?shape, history = messages.len() - 1, "prompt built");
        PromptPayload {
            shape,
            prompt,
            messages,
        }
    }

    fn snippet_directive(&self) -> String {
        let forbidden = self
            .hedge_phrases
            .iter()
            .map(|p| format!("\"{p}\""))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSTRUÇÕES OBRIGATÓRIAS:\n\
             1. Comece a resposta com o fato concreto que responde à pergunta (número, placar, \
             temperatura, data ou nome), na primeira frase.\n\
             2. Copie números e dados específicos exatamente como aparecem nos dados acima.\n\
             3. Cite as fontes somente depois da resposta.\n\
             4. Você TEM os dados acima: é proibido usar frases como {forbidden}.\n\
             5. Se os dados não responderem exatamente, apresente o dado mais próximo que eles \
             contêm, sem se esquivar."
        )
    }
}

fn unavailable_directive(user_message: &str) -> String {
    format!(
        "AVISO: a busca de informações em tempo real está temporariamente indisponível.\n\n\
         INSTRUÇÕES:\n\
         1. Diga com transparência que não foi possível consultar dados atualizados agora.\n\
         2. Sugira o comando \"buscar na web {user_message}\" ou \"pesquisar no google \
         {user_message}\" para uma busca explícita.\n\
         3. Ofereça o que você sabe por conhecimento geral, avisando que pode estar desatualizado.\n\
         4. Não responda apenas com uma recusa."
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::llm::Role;
    use chrono::Utc;

    fn entry(i: i64) -> ConversationEntry {
        ConversationEntry {
            id: i,
            timestamp: Utc::now(),
            user: format!("pergunta {i}"),
            assistant: format!("resposta {i}"),
        }
    }

    fn builder() -> PromptBuilder {
        PromptBuilder::new(&HeuristicsConfig::default())
    }

    #[test]
    fn plain_prompt_is_the_message() {
        let payload = builder().build("quem pintou a mona lisa", None, false, &[]);
        assert_eq!(payload.shape, PromptShape::Plain);
        assert_eq!(payload.messages, vec![Message::user("quem pintou a mona lisa")]);
    }

    #[test]
    fn context_precedes_the_question_in_order() {
        let context: Vec<_> = (4..=8).map(entry).collect();
        let payload = builder().build("e agora?", None, false, &context);

        assert_eq!(payload.messages.len(), 11);
        let texts: Vec<_> = payload
            .messages
            .iter()
            .map(|m| (m.role, m.text_content().unwrap_or_default().to_owned()))
            .collect();
        assert_eq!(texts[0], (Role::User, "pergunta 4".to_owned()));
        assert_eq!(texts[1], (Role::Assistant, "resposta 4".to_owned()));
        assert_eq!(texts[8], (Role::User, "pergunta 8".to_owned()));
        assert_eq!(texts[9], (Role::Assistant, "resposta 8".to_owned()));
        assert_eq!(texts[10].0, Role::User);
    }

    #[test]
    fn snippet_prompt_forbids_hedges_and_leads_with_fact() {
        let snippet = "São Paulo: máxima de 28°C, mínima de 17°C, 40% de chance de chuva.";
        let payload = builder().build(
            "qual a previsão do tempo em São Paulo",
            Some(snippet),
            true,
            &[],
        );
        assert_eq!(payload.shape, PromptShape::SnippetEnriched);
        let directive = &payload.prompt.directive;
        for hedge in &HeuristicsConfig::default().hedge_phrases {
            assert!(directive.contains(hedge.as_str()), "missing {hedge}");
        }
        assert!(directive.contains("proibido"));
        assert!(directive.contains("Comece a resposta com o fato concreto"));

        let last = payload.messages.last().and_then(Message::text_content).unwrap();
        assert!(last.contains(snippet));
        assert!(last.starts_with("PERGUNTA DO USUÁRIO: qual a previsão do tempo em São Paulo"));
    }

    #[test]
    fn snippet_wins_even_without_live_need() {
        let payload = builder().build("pergunta", Some("dados"), false, &[]);
        assert_eq!(payload.shape, PromptShape::SnippetEnriched);
    }

    #[test]
    fn missing_live_data_asks_for_transparency() {
        let payload = builder().build("placar do jogo de hoje", Some("   "), true, &[]);
        assert_eq!(payload.shape, PromptShape::SearchUnavailable);
        let last = payload.messages.last().and_then(Message::text_content).unwrap();
        assert!(last.contains("temporariamente indisponível"));
        assert!(last.contains("buscar na web placar do jogo de hoje"));
        assert!(last.contains("desatualizado"));
    }
}
