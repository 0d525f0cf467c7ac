use crate::domain::model::{Task, TranslationRequest};

// 自动检测时提示词里的源语言描述
const AUTO_SOURCE_PHRASE: &str = "自动检测的语言";

/// Build the user message sent to the provider for a request.
pub fn build_prompt(request: &TranslationRequest) -> String {
    match &request.task {
        Task::Translate => build_translation_prompt(
            &request.text,
            &request.source_lang,
            &request.target_lang,
            request.is_auto_detect(),
        ),
        Task::Rewrite { instruction } => build_rewrite_prompt(instruction, &request.text),
    }
}

fn build_translation_prompt(text: &str, source: &str, target: &str, auto: bool) -> String {
    let source = if auto { AUTO_SOURCE_PHRASE } else { source };
    format!(
        "请将以下文本从{source}翻译成{target}，只返回翻译结果，不要添加任何解释或其他内容：\n\n{text}"
    )
}

fn build_rewrite_prompt(instruction: &str, text: &str) -> String {
    format!("{}\n\n{text}", instruction.trim_end())
}

/// Minimal prompt used when probing a provider's credentials.
pub const PING_PROMPT: &str = "Hello";
