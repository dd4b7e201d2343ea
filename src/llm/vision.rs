//! Camera tasks on the vision-capable model.

use super::message::{ImageDetail, Message};
use super::{CompletionError, CompletionService, RequestOptions};

/// Instruction for object identification.
pub const IDENTIFY_INSTRUCTION: &str = "Identifique e descreva todos os objetos visíveis nesta imagem. \
Liste os objetos encontrados e forneça uma descrição detalhada do que você vê.";

/// Instruction for verbatim document text extraction.
pub const DOCUMENT_INSTRUCTION: &str = "Extraia TODO o texto visível nesta imagem de documento.

INSTRUÇÕES IMPORTANTES:
1. Extraia TODO o texto, palavra por palavra, exatamente como aparece
2. Mantenha a formatação original (quebras de linha, parágrafos, espaçamento)
3. Preserve a ordem do texto (de cima para baixo, da esquerda para a direita)
4. Se houver tabelas, mantenha a estrutura
5. Se houver listas numeradas ou com marcadores, mantenha a formatação
6. Não adicione interpretações ou explicações, apenas o texto puro
7. Se algum texto estiver ilegível, indique com [texto ilegível]
8. Retorne APENAS o texto extraído, sem comentários adicionais";

/// History label for object identification results.
pub const IDENTIFY_HISTORY_LABEL: &str = "Análise de imagem";

/// History label for document reading results.
pub const DOCUMENT_HISTORY_LABEL: &str = "Leitura de documento";

/// Describe the objects in a JPEG frame.
///
/// # Errors
///
/// Propagates the completion service error.
pub async fn identify_objects(
    service: &dyn CompletionService,
    options: &RequestOptions,
    jpeg: &[u8],
) -> Result<String, CompletionError> {
    let message = Message::user_with_jpeg(IDENTIFY_INSTRUCTION, jpeg, None);
    service.complete(&[message], options).await
}

/// Extract the text of a photographed document.
///
/// # Errors
///
/// Propagates the completion service error.
pub async fn extract_document_text(
    service: &dyn CompletionService,
    options: &RequestOptions,
    jpeg: &[u8],
) -> Result<String, CompletionError> {
    let message = Message::user_with_jpeg(DOCUMENT_INSTRUCTION, jpeg, Some(ImageDetail::High));
    service.complete(&[message], options).await
}
