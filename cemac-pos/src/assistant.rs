//! JAVI assistant
//!
//! Builds a business summary for the model, keeps the conversation in local
//! storage and caches generated recommendations for an hour. Requests go to
//! the local server, which holds the model API key.

use std::sync::Arc;

use cemac_client::assistant::ChatRole;
use cemac_client::{AssistantApi, AssistantRequest, ChatTurn};
use serde::{Deserialize, Serialize};
use shared::models::{Alert, Product, Sale, SaleStatus};

use crate::alerts::ALERT_STOCK_CEILING;
use crate::analytics::top_products;
use crate::clock::Clock;
use crate::error::{PosError, PosResult};
use crate::pricing::format_money;
use crate::storage::{
    CONVERSATION_KEY, HOME_RECOMMENDATIONS_KEY, KeyValueStore, KeyValueStoreExt,
    RECOMMENDATIONS_KEY,
};

/// Turns kept in the stored conversation
pub const MAX_CONVERSATION_TURNS: usize = 20;

/// Recommendations older than this are regenerated (1 h)
pub const RECOMMENDATIONS_TTL_MS: i64 = 60 * 60 * 1000;

/// Longest question accepted
pub const MAX_MESSAGE_LEN: usize = 2000;

const LOW_STOCK_LISTED: usize = 10;

const RECOMMENDATIONS_PROMPT: &str = "Con base en el resumen del negocio, dame 3 recomendaciones \
concretas y breves para mejorar las ventas y el manejo de inventario de la papelería.";

const HOME_RECOMMENDATIONS_PROMPT: &str = "Con base en el resumen del negocio, dame una sola \
recomendación corta y prioritaria para hoy.";

/// Spanish summary of inventory, today's sales and alerts sent with every question
///
/// "Today" is the clock's local calendar day.
pub fn build_context(products: &[Product], sales: &[Sale], alerts: &[Alert], clock: &dyn Clock) -> String {
    let today = clock.today();
    let mut out = String::new();
    out.push_str("Eres JAVI, el asistente de la papelería CEMAC. Responde en español.\n\n");

    // Inventory
    let tracked: Vec<&Product> = products.iter().filter(|p| p.stock.is_some()).collect();
    let units: i64 = tracked.iter().map(|p| p.available_stock()).sum();
    out.push_str(&format!(
        "Inventario: {} productos ({} con stock registrado, {} unidades).\n",
        products.len(),
        tracked.len(),
        units
    ));

    let mut low: Vec<&Product> = tracked
        .iter()
        .copied()
        .filter(|p| p.stock.is_some_and(|s| s <= ALERT_STOCK_CEILING))
        .collect();
    low.sort_by_key(|p| p.stock);
    if low.is_empty() {
        out.push_str("No hay productos con stock bajo.\n");
    } else {
        out.push_str("Productos con stock bajo:\n");
        for p in low.iter().take(LOW_STOCK_LISTED) {
            out.push_str(&format!("- {}: {} unidades\n", p.name, p.available_stock()));
        }
        if low.len() > LOW_STOCK_LISTED {
            out.push_str(&format!("- y {} más\n", low.len() - LOW_STOCK_LISTED));
        }
    }

    // Today's sales
    let todays: Vec<&Sale> = sales
        .iter()
        .filter(|s| !matches!(s.status, SaleStatus::Cancelada | SaleStatus::Devuelta))
        .filter(|s| s.created_at_utc().is_some_and(|c| clock.local_date(c) == today))
        .collect();
    let revenue: f64 = todays.iter().map(|s| s.total).sum();
    out.push_str(&format!(
        "\nVentas de hoy ({}): {} ventas por {}.\n",
        today,
        todays.len(),
        format_money(revenue)
    ));

    let best = top_products(sales, 3);
    if !best.is_empty() {
        out.push_str("Productos más vendidos:\n");
        for p in &best {
            out.push_str(&format!("- {}: {} unidades\n", p.product_name, p.quantity));
        }
    }

    // Alerts
    let open = alerts.iter().filter(|a| a.status.is_open()).count();
    out.push_str(&format!("\nAlertas abiertas: {open}.\n"));
    out
}

/// Recommendation cache slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationSlot {
    Dashboard,
    Home,
}

impl RecommendationSlot {
    fn key(self) -> &'static str {
        match self {
            Self::Dashboard => RECOMMENDATIONS_KEY,
            Self::Home => HOME_RECOMMENDATIONS_KEY,
        }
    }

    fn prompt(self) -> &'static str {
        match self {
            Self::Dashboard => RECOMMENDATIONS_PROMPT,
            Self::Home => HOME_RECOMMENDATIONS_PROMPT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub text: String,
    /// Unix millis
    pub generated_at: i64,
}

pub struct AssistantService {
    api: Arc<dyn AssistantApi>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl AssistantService {
    pub fn new(api: Arc<dyn AssistantApi>, store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { api, store, clock }
    }

    fn turn(&self, role: ChatRole, content: String) -> ChatTurn {
        ChatTurn {
            role,
            content,
            at: self.clock.now().timestamp_millis(),
        }
    }

    /// Business summary as of this service's clock
    pub fn context(&self, products: &[Product], sales: &[Sale], alerts: &[Alert]) -> String {
        build_context(products, sales, alerts, self.clock.as_ref())
    }

    pub fn history(&self) -> Vec<ChatTurn> {
        self.store.get(CONVERSATION_KEY).unwrap_or_default()
    }

    /// Ask a question; both turns are stored only when the model answered
    pub async fn ask(&self, message: &str, context: Option<String>) -> PosResult<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(PosError::validation("Escribe una pregunta para JAVI"));
        }
        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err(PosError::validation(format!(
                "La pregunta es demasiado larga (máximo {MAX_MESSAGE_LEN} caracteres)"
            )));
        }

        let mut history = self.history();
        let request = AssistantRequest {
            context,
            history: history.clone(),
            message: message.to_string(),
        };
        let reply = self.api.chat(&request).await.inspect_err(|e| {
            tracing::warn!(error = %e, "Assistant request failed");
        })?;

        history.push(self.turn(ChatRole::User, message.to_string()));
        history.push(self.turn(ChatRole::Assistant, reply.reply.clone()));
        if history.len() > MAX_CONVERSATION_TURNS {
            history.drain(..history.len() - MAX_CONVERSATION_TURNS);
        }
        self.store.set(CONVERSATION_KEY, &history)?;
        Ok(reply.reply)
    }

    pub fn clear_conversation(&self) -> PosResult<()> {
        self.store.remove(CONVERSATION_KEY)?;
        tracing::info!("Assistant conversation cleared");
        Ok(())
    }

    /// Cached recommendations, regenerated when stale or forced
    pub async fn recommendations(
        &self,
        slot: RecommendationSlot,
        context: String,
        force: bool,
    ) -> PosResult<Recommendations> {
        let now = self.clock.now().timestamp_millis();
        if !force
            && let Some(cached) = self.store.get::<Recommendations>(slot.key())
            && now - cached.generated_at < RECOMMENDATIONS_TTL_MS
        {
            return Ok(cached);
        }

        let request = AssistantRequest {
            context: Some(context),
            history: Vec::new(),
            message: slot.prompt().to_string(),
        };
        let reply = self.api.chat(&request).await?;
        let fresh = Recommendations {
            text: reply.reply,
            generated_at: now,
        };
        self.store.set(slot.key(), &fresh)?;
        tracing::debug!(slot = ?slot, "Recommendations regenerated");
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use cemac_client::{AssistantReply, ClientError, ClientResult};
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct EchoAssistant {
        calls: AtomicUsize,
        fail: AtomicBool,
        last: Mutex<Option<AssistantRequest>>,
    }

    #[async_trait]
    impl AssistantApi for EchoAssistant {
        async fn chat(&self, request: &AssistantRequest) -> ClientResult<AssistantReply> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(request.clone());
            if self.fail.load(Ordering::SeqCst) {
                return Err(ClientError::Api {
                    status: 502,
                    message: "upstream".into(),
                });
            }
            Ok(AssistantReply {
                reply: format!("respuesta {n}"),
            })
        }
    }

    fn setup() -> (AssistantService, Arc<EchoAssistant>, Arc<FixedClock>) {
        let api = Arc::new(EchoAssistant::default());
        let clock = Arc::new(FixedClock::utc(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()));
        let service = AssistantService::new(api.clone(), Arc::new(MemoryStore::new()), clock.clone());
        (service, api, clock)
    }

    #[tokio::test]
    async fn test_conversation_is_bounded() {
        let (service, api, _) = setup();
        for i in 0..15 {
            service.ask(&format!("pregunta {i}"), None).await.unwrap();
        }
        let history = service.history();
        assert_eq!(history.len(), MAX_CONVERSATION_TURNS);
        assert_eq!(history.last().unwrap().content, "respuesta 14");
        assert_eq!(history[0].role, ChatRole::User);
        assert_eq!(history[0].content, "pregunta 5");

        // history sent to the proxy excludes the new question
        let last = api.last.lock().unwrap().clone().unwrap();
        assert_eq!(last.message, "pregunta 14");
        assert_eq!(last.history.len(), MAX_CONVERSATION_TURNS);
    }

    #[tokio::test]
    async fn test_failed_question_is_not_stored() {
        let (service, api, _) = setup();
        assert!(service.ask("   ", None).await.is_err());
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);

        api.fail.store(true, Ordering::SeqCst);
        assert!(matches!(service.ask("hola", None).await, Err(PosError::Client(_))));
        assert!(service.history().is_empty());

        api.fail.store(false, Ordering::SeqCst);
        service.ask("hola", None).await.unwrap();
        service.clear_conversation().unwrap();
        assert!(service.history().is_empty());
    }

    #[tokio::test]
    async fn test_recommendations_cache() {
        let (service, api, clock) = setup();
        let first = service
            .recommendations(RecommendationSlot::Dashboard, "ctx".into(), false)
            .await
            .unwrap();
        clock.advance(Duration::minutes(59));
        let cached = service
            .recommendations(RecommendationSlot::Dashboard, "ctx".into(), false)
            .await
            .unwrap();
        assert_eq!(first, cached);
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);

        // separate slot
        service
            .recommendations(RecommendationSlot::Home, "ctx".into(), false)
            .await
            .unwrap();
        assert_eq!(api.calls.load(Ordering::SeqCst), 2);

        clock.advance(Duration::minutes(2));
        let stale = service
            .recommendations(RecommendationSlot::Dashboard, "ctx".into(), false)
            .await
            .unwrap();
        assert_ne!(stale, first);

        service
            .recommendations(RecommendationSlot::Dashboard, "ctx".into(), true)
            .await
            .unwrap();
        assert_eq!(api.calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_build_context() {
        let clock = FixedClock::utc(Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap());
        let products: Vec<Product> = serde_json::from_value(serde_json::json!([
            {"id": "p1", "name": "Cuaderno", "price": 30, "stock": 2},
            {"id": "p2", "name": "Pluma", "price": 8, "stock": 200},
            {"id": "p3", "name": "Engargolado", "price": 25}
        ]))
        .unwrap();
        let sales: Vec<Sale> = serde_json::from_value(serde_json::json!([
            {"id": "v1", "total": 60, "createdAt": "2024-05-01T10:00:00Z",
             "products": [{"productId": "p1", "productName": "Cuaderno", "quantity": 2, "price": 30}]},
            {"id": "v2", "total": 10, "createdAt": "2024-04-30T10:00:00Z"}
        ]))
        .unwrap();

        let ctx = build_context(&products, &sales, &[], &clock);
        assert!(ctx.contains("Inventario: 3 productos (2 con stock registrado, 202 unidades)"));
        assert!(ctx.contains("- Cuaderno: 2 unidades"));
        assert!(!ctx.contains("Pluma: 200"));
        assert!(ctx.contains("1 ventas por $60.00"));
        assert!(ctx.contains("Alertas abiertas: 0."));
    }

    #[test]
    fn test_context_uses_local_day() {
        // 02:00 UTC on May 2 is still May 1 in Mexico City
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 5, 2, 2, 0, 0).unwrap(),
            chrono::FixedOffset::west_opt(6 * 3600).unwrap(),
        ));
        let sales: Vec<Sale> = serde_json::from_value(serde_json::json!([
            {"id": "v1", "total": 45, "createdAt": "2024-05-01T20:00:00Z"},
            {"id": "v2", "total": 10, "createdAt": "2024-05-02T07:00:00Z"}
        ]))
        .unwrap();

        let service = AssistantService::new(
            Arc::new(EchoAssistant::default()),
            Arc::new(MemoryStore::new()),
            clock,
        );
        let ctx = service.context(&[], &sales, &[]);
        assert!(ctx.contains("Ventas de hoy (2024-05-01): 1 ventas por $45.00"));
    }
}
