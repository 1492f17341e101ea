#![cfg(feature = "api")]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream;
use pfd_chat::api::{DoneEvent, FragmentEvent, Message, PageCopy, Server};
use pfd_chat::chat::{ChatMessage, ChatProvider, FragmentStream, ProviderFactory};
use pfd_chat::error::LLMError;
use pfd_chat::persona::{Persona, MISSING_KEY_NOTICE, PAGE_TITLE, PFD_GREETING};
use reqwest::StatusCode;
use serde_json::json;
use tokio::sync::oneshot;

/// Replies with fixed fragments, optionally holding the reply until released
#[derive(Clone, Default)]
struct TestFactory {
    fragments: Vec<&'static str>,
    gate: Arc<Mutex<Option<oneshot::Receiver<()>>>>,
    keys: Arc<Mutex<Vec<String>>>,
}

struct TestProvider {
    fragments: Vec<&'static str>,
}

#[async_trait]
impl ChatProvider for TestProvider {
    async fn chat_stream(&self, _: &[ChatMessage]) -> Result<FragmentStream, LLMError> {
        Ok(Box::pin(stream::iter(
            self.fragments
                .iter()
                .map(|f| Ok::<_, LLMError>(f.to_string()))
                .collect::<Vec<_>>(),
        )))
    }
}

impl ProviderFactory for TestFactory {
    fn create(&self, api_key: &str) -> Result<Box<dyn ChatProvider>, LLMError> {
        self.keys.lock().unwrap().push(api_key.to_string());
        let gate = self.gate.lock().unwrap().take();
        match gate {
            Some(gate) => Ok(Box::new(GatedProvider {
                fragments: self.fragments.clone(),
                gate: Mutex::new(Some(gate)),
            })),
            None => Ok(Box::new(TestProvider {
                fragments: self.fragments.clone(),
            })),
        }
    }
}

/// Holds back its reply until the test drops or fires the gate
struct GatedProvider {
    fragments: Vec<&'static str>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

#[async_trait]
impl ChatProvider for GatedProvider {
    async fn chat_stream(&self, _: &[ChatMessage]) -> Result<FragmentStream, LLMError> {
        let gate = self.gate.lock().unwrap().take();
        let reply = self.fragments.concat();
        Ok(Box::pin(stream::once(async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            Ok::<_, LLMError>(reply)
        })))
    }
}

async fn serve(server: Server) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, server.router()).await.unwrap();
    });
    format!("http://{addr}")
}

/// Splits an SSE body into `(event, data)` pairs
fn parse_events(body: &str) -> Vec<(String, String)> {
    body.split("\n\n")
        .filter_map(|block| {
            let mut name = None;
            let mut data = Vec::new();
            for line in block.lines() {
                if let Some(v) = line.strip_prefix("event:") {
                    name = Some(v.trim().to_string());
                } else if let Some(v) = line.strip_prefix("data:") {
                    data.push(v.strip_prefix(' ').unwrap_or(v));
                }
            }
            name.map(|n| (n, data.join("\n")))
        })
        .collect()
}

async fn transcript(client: &reqwest::Client, base: &str) -> Vec<Message> {
    client
        .get(format!("{base}/api/messages"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_index_and_page_copy() {
    let base = serve(Server::new(TestFactory::default(), Persona::pfd_toolkit())).await;
    let client = reqwest::Client::new();

    let page = client.get(&base).send().await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    assert!(page.text().await.unwrap().contains("/api/chat"));

    let copy: PageCopy = client
        .get(format!("{base}/api/page"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(copy.title, PAGE_TITLE);
    assert_eq!(copy.missing_key, MISSING_KEY_NOTICE);
    assert!(!copy.links.is_empty());
}

#[tokio::test]
async fn test_initial_transcript_hides_system_prompt() {
    let base = serve(Server::new(TestFactory::default(), Persona::pfd_toolkit())).await;
    let client = reqwest::Client::new();

    let messages = transcript(&client, &base).await;

    assert_eq!(
        messages,
        vec![Message {
            role: "assistant".into(),
            content: PFD_GREETING.into(),
        }]
    );
}

#[tokio::test]
async fn test_chat_without_key_is_refused() {
    let factory = TestFactory {
        fragments: vec!["unused"],
        ..Default::default()
    };
    let keys = factory.keys.clone();
    let base = serve(Server::new(factory, Persona::pfd_toolkit())).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/chat"))
        .json(&json!({"message": "hello"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.text().await.unwrap(), MISSING_KEY_NOTICE);
    assert_eq!(transcript(&client, &base).await.len(), 1);
    assert!(keys.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_streams_fragments_then_done() {
    let factory = TestFactory {
        fragments: vec!["Inquests ", "are ", "public."],
        ..Default::default()
    };
    let keys = factory.keys.clone();
    let base = serve(Server::new(factory, Persona::pfd_toolkit())).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/chat"))
        .json(&json!({"message": "Are inquests public?", "api_key": "sk-page"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let events = parse_events(&resp.text().await.unwrap());

    let fragments: Vec<FragmentEvent> = events
        .iter()
        .filter(|(name, _)| name == "fragment")
        .map(|(_, data)| serde_json::from_str(data).unwrap())
        .collect();
    assert_eq!(fragments.len(), 3);
    assert_eq!(fragments[1].text, "are ");
    assert_eq!(fragments[1].accumulated, "Inquests are ");

    let (name, data) = events.last().unwrap();
    assert_eq!(name, "done");
    let done: DoneEvent = serde_json::from_str(data).unwrap();
    assert!(!done.failed);
    assert_eq!(done.content, "Inquests are public.");

    let messages = transcript(&client, &base).await;
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].role, "user");
    assert_eq!(messages[1].content, "Are inquests public?");
    assert_eq!(messages[2].content, "Inquests are public.");
    assert_eq!(keys.lock().unwrap().as_slice(), ["sk-page"]);
}

#[tokio::test]
async fn test_blank_message_is_rejected() {
    let server = Server::new(TestFactory::default(), Persona::pfd_toolkit()).with_credential("sk");
    let base = serve(server).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/chat"))
        .json(&json!({"message": "   "}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(transcript(&client, &base).await.len(), 1);
}

#[tokio::test]
async fn test_reset_restores_greeting() {
    let factory = TestFactory {
        fragments: vec!["ok"],
        ..Default::default()
    };
    let base = serve(Server::new(factory, Persona::pfd_toolkit()).with_credential("sk")).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/chat"))
        .json(&json!({"message": "hello"}))
        .send()
        .await
        .unwrap();
    resp.text().await.unwrap();
    assert_eq!(transcript(&client, &base).await.len(), 3);

    let reset = client
        .post(format!("{base}/api/reset"))
        .send()
        .await
        .unwrap();
    assert_eq!(reset.status(), StatusCode::NO_CONTENT);

    let messages = transcript(&client, &base).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, PFD_GREETING);
}

#[tokio::test]
async fn test_overlapping_turn_is_refused() {
    let (release, gate) = oneshot::channel();
    let factory = TestFactory {
        fragments: vec!["slow reply"],
        gate: Arc::new(Mutex::new(Some(gate))),
        ..Default::default()
    };
    let base = serve(Server::new(factory, Persona::pfd_toolkit()).with_credential("sk")).await;
    let client = reqwest::Client::new();

    let first = client
        .post(format!("{base}/api/chat"))
        .json(&json!({"message": "first"}))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = client
        .post(format!("{base}/api/chat"))
        .json(&json!({"message": "second"}))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let reset = client
        .post(format!("{base}/api/reset"))
        .send()
        .await
        .unwrap();
    assert_eq!(reset.status(), StatusCode::CONFLICT);

    release.send(()).unwrap();
    let events = parse_events(&first.text().await.unwrap());
    let (name, data) = events.last().unwrap();
    assert_eq!(name, "done");
    assert!(data.contains("slow reply"));

    let messages = transcript(&client, &base).await;
    let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, [PFD_GREETING, "first", "slow reply"]);
}
