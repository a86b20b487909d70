//! Arbiter behaviour while the model is still thinking.

use ollama_games::{
    Arbiter, ChatMessage, CompletionGateway, GatewayError, HttpGateway, MoverClient, Origin, Phase,
    SubmitError,
};
use ollama_tictactoe::{Board, Cell, Mark};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Gateway that holds its reply until the test releases it.
struct GatedGateway {
    entered: Arc<Notify>,
    release: Arc<Notify>,
    reply: String,
}

#[async_trait::async_trait]
impl CompletionGateway for GatedGateway {
    async fn complete(&self, _messages: Vec<ChatMessage>) -> Result<String, GatewayError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(self.reply.clone())
    }
}

#[tokio::test]
async fn test_reply_after_reset_is_discarded() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let arbiter = Arbiter::new(MoverClient::new(Arc::new(GatedGateway {
        entered: entered.clone(),
        release: release.clone(),
        reply: "0".to_string(),
    })));

    let pending = tokio::spawn({
        let arbiter = arbiter.clone();
        async move { arbiter.play(4).await }
    });
    entered.notified().await;

    let thinking = arbiter.snapshot();
    assert_eq!(thinking.phase, Phase::RequestingAutomatedMove);
    assert_eq!(thinking.state.board().get(4), Some(Cell::Marked(Mark::X)));
    assert_eq!(arbiter.play(0).await, Err(SubmitError::AwaitingAutomatedMove));

    let fresh = arbiter.reset();
    assert_eq!(fresh.generation, 1);
    release.notify_one();

    let after = pending.await.unwrap().unwrap();
    assert_eq!(after.generation, 1);
    assert_eq!(after.phase, Phase::AwaitingHumanMove);
    assert_eq!(*after.state.board(), Board::new());
    assert!(after.log.is_empty());
}

#[tokio::test]
async fn test_unreachable_gateway_stalls_session() {
    let closed = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/api/chat", closed.local_addr().unwrap());
    drop(closed);
    let gateway = HttpGateway::new(url, Duration::from_secs(5)).unwrap();
    let arbiter = Arbiter::new(MoverClient::new(Arc::new(gateway)));

    let snapshot = arbiter.play(4).await.unwrap();
    assert_eq!(snapshot.phase, Phase::Stalled);
    let last = snapshot.log.last().unwrap();
    assert_eq!(last.origin, Origin::System);
    assert!(last.text.starts_with("Error communicating with Ollama"));

    assert_eq!(arbiter.play(0).await, Err(SubmitError::Stalled));
    assert_eq!(arbiter.reset().phase, Phase::AwaitingHumanMove);
}

#[tokio::test]
async fn test_dropped_caller_still_settles_session() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let arbiter = Arbiter::new(MoverClient::new(Arc::new(GatedGateway {
        entered: entered.clone(),
        release: release.clone(),
        reply: "0".to_string(),
    })));

    let caller = tokio::spawn({
        let arbiter = arbiter.clone();
        async move { arbiter.play(4).await }
    });
    entered.notified().await;
    caller.abort();
    assert!(caller.await.unwrap_err().is_cancelled());

    release.notify_one();
    let settled = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = arbiter.snapshot();
            if snapshot.phase != Phase::RequestingAutomatedMove {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    assert_eq!(settled.phase, Phase::AwaitingHumanMove);
    assert_eq!(settled.state.board().get(0), Some(Cell::Marked(Mark::O)));
    assert_eq!(
        settled.log.last().map(|entry| entry.text.as_str()),
        Some("Ollama (O) moved to position 0")
    );

    release.notify_one();
    assert!(arbiter.play(8).await.is_ok());
}
