//! Prompt template for transcript analysis.
//!
//! The instruction text stays in Russian: the re-engagement message must use the
//! formal capitalised «Вы», which only makes sense in the language of the chats.

use crate::domain::entities::FOLLOW_UP_DELIMITER;

/// Build the analysis prompt with the transcript embedded verbatim.
pub fn build_analysis_prompt(transcript: &str) -> String {
    format!(
        "
Пожалуйста, внимательно проанализируй следующую переписку.
Твоя задача - сделать короткий вывод (одно-два предложения) о сути разговора.
Если в переписке человек проявлял интерес к обучению или подобным услугам, но разговор не был завершен, составь короткое и вежливое сообщение, чтобы возобновить диалог.
Не используй имя собеседника, обращайся на \"Вы\" с большой буквы.
Перед новым сообщением для клиента поставь разделитель: {delimiter}

Вот переписка:
{transcript}
",
        delimiter = FOLLOW_UP_DELIMITER,
        transcript = transcript
    )
}
