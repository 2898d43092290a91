//! Evaluation request sent to the arbiter model.

use std::fmt::Write;

use crate::knowledge::Candidate;

pub const SYSTEM_PROMPT: &str =
    "Ты — профессиональный ассистент службы поддержки. Отвечай только в формате JSON.";

/// A system + user message pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RerankPrompt {
    pub system: String,
    pub user: String,
}

impl RerankPrompt {
    /// Serializes the question and numbered candidates (1-based) into the evaluation request.
    pub fn build(question: &str, candidates: &[Candidate]) -> Self {
        let mut listing = String::new();
        for (i, candidate) in candidates.iter().enumerate() {
            let entry = &candidate.entry;
            // Writing into a String cannot fail.
            let _ = write!(
                listing,
                "Кандидат {} (сходство: {:.2}):\nВопрос: {}\nКатегория: {} / {}\nШаблон ответа: {}\n\n",
                i + 1,
                candidate.similarity,
                entry.question,
                or_dash(&entry.category),
                or_dash(&entry.subcategory),
                entry.template,
            );
        }

        let user = format!(
            "Ты оцениваешь, какой шаблон ответа из базы знаний лучше всего отвечает на вопрос клиента.

Вопрос клиента:
{question}

Кандидаты из базы знаний:
{listing}Инструкции:
1. Оцени каждого кандидата целым числом от 0 до 100: насколько его шаблон подходит как ответ на вопрос клиента.
2. Кратко объясни каждую оценку одним предложением.
3. Отсортируй кандидатов по убыванию оценки.
4. Используй номера кандидатов от 1 до {count}.

Верни ответ СТРОГО в формате JSON:
{{
  \"ranking\": [
    {{\"candidate\": 1, \"confidence\": 92, \"reason\": \"Краткое обоснование\"}}
  ]
}}

Важно: верни ТОЛЬКО JSON, без дополнительного текста.",
            question = question.trim(),
            listing = listing,
            count = candidates.len(),
        );

        Self {
            system: SYSTEM_PROMPT.to_string(),
            user,
        }
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "—" } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeEntry;

    #[test]
    fn test_prompt_lists_candidates_in_order() {
        let candidates = vec![
            Candidate::new(
                KnowledgeEntry::new(0, "Как сбросить пароль?", "Перейдите в настройки")
                    .with_category("Аккаунт", "Пароль"),
                0.912,
            ),
            Candidate::new(KnowledgeEntry::new(1, "Где мой заказ?", "Проверьте статус"), 0.5),
        ];

        let prompt = RerankPrompt::build("Забыл пароль", &candidates);
        assert_eq!(prompt.system, SYSTEM_PROMPT);
        assert!(prompt.user.contains("Забыл пароль"));
        assert!(prompt.user.contains("Кандидат 1 (сходство: 0.91)"));
        assert!(prompt.user.contains("Категория: Аккаунт / Пароль"));
        assert!(prompt.user.contains("Кандидат 2 (сходство: 0.50)"));
        assert!(prompt.user.contains("Категория: — / —"));
        assert!(prompt.user.contains("от 1 до 2"));

        let first = prompt.user.find("Кандидат 1").expect("first");
        let second = prompt.user.find("Кандидат 2").expect("second");
        assert!(first < second);
    }
}
