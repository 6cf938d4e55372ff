use std::time::Duration;

use braintrace_core::{AnswerReply, ConversationId, Message, MessageDraft, SourceEntry};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::wire::{
    AnswerBody, AnswerPayload, BrainRecord, ChatRecord, GraphPayload, MessagePayload,
    ReferencedPayload, SaveChatBody, SavedChat, SourceCountPayload, SourcesPayload,
};
use crate::{BackendError, FailureKind};

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Answer generation can take a while; this bounds every request.
    pub request_timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Knowledge-base backend operations consumed by the chat surface.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn conversation_metadata(&self, id: &ConversationId) -> Result<String, BackendError>;

    async fn fetch_transcript(&self, id: &ConversationId) -> Result<Vec<Message>, BackendError>;

    async fn delete_transcript(&self, id: &ConversationId) -> Result<(), BackendError>;

    /// Saves one message and returns its server chat id.
    async fn persist_message(
        &self,
        id: &ConversationId,
        draft: &MessageDraft,
    ) -> Result<i64, BackendError>;

    async fn request_answer(
        &self,
        question: &str,
        id: &ConversationId,
        model_hint: &str,
    ) -> Result<AnswerReply, BackendError>;

    async fn lookup_sources(
        &self,
        entity_name: &str,
        id: &ConversationId,
    ) -> Result<Vec<SourceEntry>, BackendError>;

    async fn lookup_referenced_entities(&self, chat_id: i64) -> Result<Vec<String>, BackendError>;

    /// Authoritative message text, without the trailing referenced-node block.
    async fn fetch_message_text(&self, chat_id: i64) -> Result<String, BackendError>;

    async fn count_sources(&self, id: &ConversationId) -> Result<u64, BackendError>;

    /// Names of every entity in the conversation's knowledge graph.
    async fn fetch_entity_names(&self, id: &ConversationId) -> Result<Vec<String>, BackendError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let mut base_url = settings.base_url;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base = Url::parse(&base_url)
            .map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| BackendError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { base, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base
            .join(path)
            .map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, BackendError> {
        let url = self.endpoint(path)?;
        let response = self.send(self.client.get(url).query(query)).await?;
        response.json::<T>().await.map_err(map_reqwest_error)
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let url = self.endpoint(path)?;
        let response = self
            .send(self.client.request(method, url).json(body))
            .await?;
        response.json::<T>().await.map_err(map_reqwest_error)
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn conversation_metadata(&self, id: &ConversationId) -> Result<String, BackendError> {
        let record: BrainRecord = self.get_json(&format!("brains/{id}"), &[]).await?;
        Ok(record.brain_name)
    }

    async fn fetch_transcript(&self, id: &ConversationId) -> Result<Vec<Message>, BackendError> {
        match self
            .get_json::<Vec<ChatRecord>>(&format!("chat/session/{id}"), &[])
            .await
        {
            Ok(records) => Ok(records.into_iter().map(Message::from).collect()),
            // The backend answers 404 for a conversation that has no history yet.
            Err(err) if err.kind == FailureKind::HttpStatus(StatusCode::NOT_FOUND.as_u16()) => {
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    async fn delete_transcript(&self, id: &ConversationId) -> Result<(), BackendError> {
        let url = self.endpoint(&format!("chat/session/{id}"))?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn persist_message(
        &self,
        id: &ConversationId,
        draft: &MessageDraft,
    ) -> Result<i64, BackendError> {
        let saved: SavedChat = self
            .send_json(
                Method::POST,
                &format!("chat/session/{id}"),
                &SaveChatBody::from(draft),
            )
            .await?;
        Ok(saved.chat_id)
    }

    async fn request_answer(
        &self,
        question: &str,
        id: &ConversationId,
        model_hint: &str,
    ) -> Result<AnswerReply, BackendError> {
        let body = AnswerBody {
            question,
            brain_id: id.as_str(),
            model: model_hint,
        };
        let payload: AnswerPayload = self
            .send_json(Method::POST, "brainGraph/answer", &body)
            .await?;
        Ok(AnswerReply::from(payload))
    }

    async fn lookup_sources(
        &self,
        entity_name: &str,
        id: &ConversationId,
    ) -> Result<Vec<SourceEntry>, BackendError> {
        let payload: SourcesPayload = self
            .get_json(
                "brainGraph/getSourceIds",
                &[("node_name", entity_name), ("brain_id", id.as_str())],
            )
            .await?;
        Ok(payload.sources.into_iter().map(SourceEntry::from).collect())
    }

    async fn lookup_referenced_entities(&self, chat_id: i64) -> Result<Vec<String>, BackendError> {
        let payload: ReferencedPayload = self
            .get_json(&format!("chat/{chat_id}/referenced_nodes"), &[])
            .await?;
        Ok(payload.referenced_nodes.unwrap_or_default().into_names())
    }

    async fn fetch_message_text(&self, chat_id: i64) -> Result<String, BackendError> {
        let payload: MessagePayload = self
            .get_json(&format!("chat/{chat_id}/message"), &[])
            .await?;
        Ok(payload.message)
    }

    async fn count_sources(&self, id: &ConversationId) -> Result<u64, BackendError> {
        let payload: SourceCountPayload = self
            .get_json(&format!("brainGraph/sourceCount/{id}"), &[])
            .await?;
        Ok(payload.total_count)
    }

    async fn fetch_entity_names(&self, id: &ConversationId) -> Result<Vec<String>, BackendError> {
        let payload: GraphPayload = self
            .get_json(&format!("brainGraph/getNodeEdge/{id}"), &[])
            .await?;
        Ok(payload.nodes.into_iter().map(|node| node.name).collect())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return BackendError::new(FailureKind::Decode, err.to_string());
    }
    BackendError::new(FailureKind::Network, err.to_string())
}
