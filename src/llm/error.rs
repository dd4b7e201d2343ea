//! Completion service errors.
//!
//! Non-2xx responses are classified by status and the machine-readable
//! `error.type` / `error.code` into an [`ApiErrorKind`], each with its own
//! explanatory message and short spoken summary.

/// Upstream failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Billing quota exhausted (429 `insufficient_quota`).
    QuotaExceeded,
    /// Too many requests (other 429).
    RateLimited,
    /// Missing, revoked or malformed API key (401 / `invalid_api_key`).
    InvalidCredential,
    /// Upstream 5xx.
    ServerError,
    /// Anything else.
    Generic,
}

impl ApiErrorKind {
    /// Classify an error response.
    pub fn classify(status: u16, error_type: Option<&str>, code: Option<&str>) -> Self {
        let is = |needle: &str| error_type == Some(needle) || code == Some(needle);
        match status {
            429 if is("insufficient_quota") => Self::QuotaExceeded,
            429 => Self::RateLimited,
            401 => Self::InvalidCredential,
            _ if is("invalid_api_key") => Self::InvalidCredential,
            500..=599 => Self::ServerError,
            _ => Self::Generic,
        }
    }

    /// Explanation with remediation steps, shown to the user.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::QuotaExceeded => {
                "❌ Cota da API excedida.\n\n\
                 Sua conta atingiu o limite de uso ou está sem créditos.\n\n\
                 Como resolver:\n\
                 1. Acesse https://platform.openai.com/account/billing\n\
                 2. Verifique o saldo e adicione créditos\n\
                 3. Tente novamente\n\n\
                 Os comandos locais continuam funcionando (diga \"ajuda\")."
            }
            Self::RateLimited => {
                "⏳ Muitas requisições em pouco tempo.\n\n\
                 Aguarde alguns segundos e tente novamente."
            }
            Self::InvalidCredential => {
                "🔑 Chave de API inválida.\n\n\
                 Como resolver:\n\
                 1. Gere uma nova chave em https://platform.openai.com/api-keys\n\
                 2. Configure-a em `completion.api_key` ou na variável OPENAI_API_KEY\n\
                 3. Reinicie o assistente"
            }
            Self::ServerError => {
                "⚠️ O serviço de IA está instável no momento.\n\n\
                 O problema é do lado do servidor; tente novamente em instantes."
            }
            Self::Generic => {
                "⚠️ Não foi possível obter uma resposta agora.\n\n\
                 Tente novamente ou use um comando específico (diga \"ajuda\")."
            }
        }
    }

    /// Short sentence to speak.
    pub fn spoken_summary(self) -> &'static str {
        match self {
            Self::QuotaExceeded => "A cota da API foi excedida. Verifique seus créditos.",
            Self::RateLimited => "Muitas requisições. Aguarde um momento.",
            Self::InvalidCredential => "A chave de API é inválida.",
            Self::ServerError => "O serviço está instável. Tente novamente em instantes.",
            Self::Generic => "Desculpe, não consegui processar sua pergunta.",
        }
    }
}

/// Errors from a completion call.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// No usable API key or invalid client settings.
    #[error("completion config error: {0}")]
    Config(String),

    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx response.
    #[error("API error {status} ({kind:?}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Classified category.
        kind: ApiErrorKind,
        /// `error.message` from the body, or the raw body.
        message: String,
    },

    /// 2xx with no choices.
    #[error("empty response from completion service")]
    EmptyResponse,

    /// 2xx body that could not be decoded.
    #[error("malformed completion response: {0}")]
    Parse(String),
}

impl CompletionError {
    /// Category used for user-facing text.
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            Self::Api { kind, .. } => *kind,
            _ => ApiErrorKind::Generic,
        }
    }

    /// Explanation with remediation steps.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Config(_) => {
                "🔑 Chave de API não configurada.\n\n\
                 Defina `completion.api_key` no arquivo de configuração ou a \
                 variável OPENAI_API_KEY. Os comandos locais continuam funcionando."
            }
            other => other.kind().user_message(),
        }
    }

    /// Short sentence to speak.
    pub fn spoken_summary(&self) -> &'static str {
        match self {
            Self::Config(_) => "A chave de API não está configurada.",
            other => other.kind().spoken_summary(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_table() {
        let cases = [
            (429, None, Some("insufficient_quota"), ApiErrorKind::QuotaExceeded),
            (429, Some("insufficient_quota"), None, ApiErrorKind::QuotaExceeded),
            (429, Some("requests"), Some("rate_limit_exceeded"), ApiErrorKind::RateLimited),
            (401, None, None, ApiErrorKind::InvalidCredential),
            (400, Some("invalid_request_error"), Some("invalid_api_key"), ApiErrorKind::InvalidCredential),
            (500, None, None, ApiErrorKind::ServerError),
            (503, Some("server_error"), None, ApiErrorKind::ServerError),
            (404, Some("invalid_request_error"), Some("model_not_found"), ApiErrorKind::Generic),
        ];
        for (status, ty, code, expected) in cases {
            assert_eq!(ApiErrorKind::classify(status, ty, code), expected, "{status} {ty:?} {code:?}");
        }
    }

    #[test]
    fn every_kind_has_distinct_texts() {
        let kinds = [
            ApiErrorKind::QuotaExceeded,
            ApiErrorKind::RateLimited,
            ApiErrorKind::InvalidCredential,
            ApiErrorKind::ServerError,
            ApiErrorKind::Generic,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a.user_message(), b.user_message());
                assert_ne!(a.spoken_summary(), b.spoken_summary());
            }
        }
    }

    #[test]
    fn non_api_errors_are_generic() {
        assert_eq!(CompletionError::EmptyResponse.kind(), ApiErrorKind::Generic);
        assert_eq!(
            CompletionError::Transport("reset".into()).spoken_summary(),
            ApiErrorKind::Generic.spoken_summary()
        );
        assert!(CompletionError::Config("no key".into())
            .user_message()
            .contains("OPENAI_API_KEY"));
    }
}
