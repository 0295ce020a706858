use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::client::{AnswerService, GenerationRequest};
use crate::data::Organization;

/// Reply used when the service answered with no text
pub const EMPTY_REPLY_FALLBACK: &str =
    "Вибачте, я не зміг згенерувати відповідь. Спробуйте ще раз.";

/// Reply used when the call failed (missing key, network, bad response)
pub const SERVICE_ERROR_FALLBACK: &str =
    "Вибачте, сталася помилка при зверненні до сервісу. Перевірте з'єднання або API ключ.";

pub const DEFAULT_TEMPERATURE: f32 = 0.4;

pub const SYSTEM_INSTRUCTION: &str = "Ти — професійний AI-консультант з питань соціального захисту для південного регіону України (Одеса, Миколаїв, Херсон).

ТВОЯ МОВА — ВИКЛЮЧНО УКРАЇНСЬКА. Відповідай українською мовою за будь-яких обставин.

Твоє завдання:
1. Допомагати людям знаходити благодійні фонди, притулки та соціальні послуги на основі наданих даних.
2. Бути емпатичним, ввічливим та конкретним.
3. Якщо запитують контакти, обов'язково надавай номер телефону та пошту.
4. Якщо інформації немає в наданій базі даних, чесно повідом про це і запропонуй звернутися до загальних гарячих ліній.
5. Форматуй відповідь чітко (використовуй списки, жирний шрифт для назв).";

/// Fields of an organization the assistant gets to see. Coordinates and
/// budget stay out of the prompt.
#[derive(Debug, Serialize)]
pub struct OrganizationContext<'a> {
    pub name: &'a str,
    pub address: &'a str,
    pub services: &'a str,
    pub phone: &'a str,
    pub email: &'a str,
    pub category: &'a str,
}

impl<'a> From<&'a Organization> for OrganizationContext<'a> {
    fn from(org: &'a Organization) -> Self {
        Self {
            name: &org.name,
            address: &org.address,
            services: &org.services,
            phone: &org.phone,
            email: &org.email,
            category: &org.category,
        }
    }
}

/// Pretty JSON of the projected organizations
pub fn context_json(organizations: &[&Organization]) -> serde_json::Result<String> {
    let projected: Vec<OrganizationContext> = organizations
        .iter()
        .map(|&org| OrganizationContext::from(org))
        .collect();
    serde_json::to_string_pretty(&projected)
}

pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "База даних організацій: {}\n\nЗапитання користувача: {}",
        context, question
    )
}

/// Forwards a question plus the visible organizations to the answering
/// service. Stateless: no retry, no cache, every call stands alone.
#[derive(Clone)]
pub struct AssistantBridge {
    service: Arc<dyn AnswerService>,
    temperature: f32,
}

impl AssistantBridge {
    pub fn new(service: Arc<dyn AnswerService>, temperature: f32) -> Self {
        Self {
            service,
            temperature,
        }
    }

    pub fn request_for(&self, question: &str, organizations: &[&Organization]) -> serde_json::Result<GenerationRequest> {
        let context = context_json(organizations)?;
        Ok(GenerationRequest {
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            prompt: build_prompt(&context, question),
            temperature: self.temperature,
        })
    }

    /// Always resolves to text: the reply, or a fallback message
    pub async fn ask(&self, question: &str, organizations: &[&Organization]) -> String {
        let request = match self.request_for(question, organizations) {
            Ok(request) => request,
            Err(e) => {
                error!(target: "assistant", "Failed to serialize context: {}", e);
                return SERVICE_ERROR_FALLBACK.to_string();
            }
        };

        info!(
            target: "assistant",
            "Asking with {} organizations in context",
            organizations.len()
        );

        match self.service.generate(&request).await {
            Ok(Some(text)) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!(target: "assistant", "Service returned an empty reply");
                EMPTY_REPLY_FALLBACK.to_string()
            }
            Err(e) => {
                error!(target: "assistant", "Assistant API error: {:#}", e);
                SERVICE_ERROR_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::seed::builtin_organizations;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recording {
        reply: Result<Option<String>, String>,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    #[async_trait]
    impl AnswerService for Recording {
        async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone().map_err(|e| anyhow!(e))
        }
    }

    fn bridge(reply: Result<Option<String>, String>) -> (AssistantBridge, Arc<Recording>) {
        let service = Arc::new(Recording {
            reply,
            seen: Mutex::new(Vec::new()),
        });
        (AssistantBridge::new(service.clone(), DEFAULT_TEMPERATURE), service)
    }

    #[test]
    fn test_context_excludes_coordinates_and_budget() {
        let orgs = builtin_organizations();
        let view: Vec<&Organization> = orgs.iter().take(1).collect();
        let json = context_json(&view).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = parsed[0].as_object().unwrap();
        let mut keys: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        keys.sort();
        assert_eq!(keys, vec!["address", "category", "email", "name", "phone", "services"]);
        assert!(json.contains("Корпорація Монстрів"));
    }

    #[tokio::test]
    async fn test_reply_is_passed_through() {
        let (bridge, service) = bridge(Ok(Some("Карітас Одеса".to_string())));
        let orgs = builtin_organizations();
        let view: Vec<&Organization> = orgs.iter().collect();

        let reply = bridge.ask("де знайти притулок?", &view).await;
        assert_eq!(reply, "Карітас Одеса");

        let seen = service.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].prompt.ends_with("Запитання користувача: де знайти притулок?"));
        assert_eq!(seen[0].system_instruction, SYSTEM_INSTRUCTION);
        assert_eq!(seen[0].temperature, DEFAULT_TEMPERATURE);
    }

    #[tokio::test]
    async fn test_empty_reply_uses_fallback() {
        let (bridge, _) = bridge(Ok(Some("   ".to_string())));
        assert_eq!(bridge.ask("?", &[]).await, EMPTY_REPLY_FALLBACK);
    }

    #[tokio::test]
    async fn test_failure_uses_fallback() {
        let (bridge, _) = bridge(Err("connection refused".to_string()));
        assert_eq!(bridge.ask("?", &[]).await, SERVICE_ERROR_FALLBACK);
    }
}
