//! Echo service
//!
//! Actions posted to `post_message` show up as events of the `new_message`
//! trigger. Run with `IFTTT_SERVICE_KEY=... cargo run --example echo_service`.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::Level;

use ifttt_rs::protocol::DynamicOption;
use ifttt_rs::server::ServiceBuilder;
use ifttt_rs::transport::{HttpServer, HttpServerOptions};
use ifttt_rs::{
    Action, ActionInvokeRequest, ActionResult, HandlerError, Notification, Notifier, Request,
    Trigger, TriggerEvent, TriggerEventCollection, TriggerPollRequest, UserInfo,
};

#[derive(Default)]
struct Messages {
    events: Mutex<Vec<TriggerEvent>>,
}

struct PostMessage {
    messages: Arc<Messages>,
    notifier: Option<Notifier>,
}

#[async_trait]
impl Action for PostMessage {
    async fn handle(
        &self,
        invoke: &ActionInvokeRequest,
        request: &Request,
    ) -> Result<ActionResult, HandlerError> {
        let text = invoke
            .action_fields
            .get("message")
            .filter(|text| !text.is_empty())
            .ok_or_else(|| HandlerError::skip("A message is required"))?;

        let id = uuid::Uuid::new_v4().to_string();
        let channel = invoke
            .action_fields
            .get("channel")
            .cloned()
            .unwrap_or_default();
        let event = TriggerEvent::new(id.clone(), Utc::now())
            .with_ingredient("message", text.as_str())
            .with_ingredient("channel", channel);
        self.messages.events.lock().await.push(event);

        if let Some(notifier) = &self.notifier {
            let mut notification = Notification::new();
            if notification.add_user(request.access_token()).is_ok() {
                if let Err(e) = notifier.notify(&notification).await {
                    tracing::warn!("Realtime notification failed: {}", e);
                }
            }
        }

        Ok(ActionResult::new(id))
    }

    async fn options(&self, _request: &Request) -> Result<DynamicOption, HandlerError> {
        let mut options = DynamicOption::new();
        options.add_string("General", "general").add_string("Random", "random");
        Ok(options)
    }
}

struct NewMessage {
    messages: Arc<Messages>,
}

#[async_trait]
impl Trigger for NewMessage {
    async fn poll(
        &self,
        poll: &TriggerPollRequest,
        _request: &Request,
    ) -> Result<TriggerEventCollection, HandlerError> {
        let events = self.messages.events.lock().await;
        Ok(events.iter().rev().take(poll.limit).cloned().collect())
    }

    fn is_realtime(&self) -> bool {
        true
    }
}

async fn user_info(request: Request) -> Result<UserInfo, HandlerError> {
    if request.access_token().is_empty() {
        return Err(HandlerError::invalid_token());
    }
    Ok(UserInfo::new("Echo User", request.access_token()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let messages = Arc::new(Messages::default());
    let service = ServiceBuilder::from_env()
        .with_user_info_fn(user_info)
        .register_trigger(
            "new_message",
            NewMessage {
                messages: messages.clone(),
            },
        )
        .build()
        .await?;

    let notifier = match std::env::var("IFTTT_REALTIME") {
        Ok(flag) if flag == "1" => Some(service.notifier()?),
        _ => None,
    };
    service
        .registry()
        .register_action(
            "post_message",
            PostMessage {
                messages,
                notifier,
            },
        )
        .await;

    let options = HttpServerOptions {
        bind_address: std::env::var("BIND_ADDRESS")
            .unwrap_or_else(|_| HttpServerOptions::default().bind_address),
        ..HttpServerOptions::default()
    };
    let mut server = HttpServer::new(Arc::new(service), options);
    let addr = server.start().await?;
    println!("Echo service listening on http://{}/ifttt/v1", addr);

    tokio::signal::ctrl_c().await?;
    server.close().await?;
    Ok(())
}
