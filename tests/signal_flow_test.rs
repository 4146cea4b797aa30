// Integration test: drives the router through whole call lifecycles against
// an in-memory directory and store, checking what each party receives and
// what ends up in the call log.

use std::sync::Arc;
use std::time::Duration;

use callrelay::calls::{IncomingCallNotice, Routed, SessionContext, SignalRouter, SignalType};
use callrelay::directory::ChannelDirectory;
use callrelay::store::{CallLogStore, MemoryStore};
use callrelay::types::{CallOutcome, CallStatus, ParticipantProfile};
use chrono::Utc;
use tokio::sync::mpsc::UnboundedReceiver;

const TENANT: &str = "acme";
const ALICE: &str = "alice@acme.test";
const BOB: &str = "bob@acme.test";
const CONVERSATION: i64 = 7;

struct Harness {
    router: Arc<SignalRouter>,
    store: Arc<MemoryStore>,
    alice: UnboundedReceiver<String>,
    bob: UnboundedReceiver<String>,
}

impl Harness {
    fn new() -> Self {
        let directory = Arc::new(ChannelDirectory::new());
        let store = Arc::new(MemoryStore::new());
        store.add_conversation(
            TENANT,
            CONVERSATION,
            vec![
                ParticipantProfile::new(1, ALICE, "Alice"),
                ParticipantProfile::new(2, BOB, "Bob"),
            ],
        );
        let (_, alice) = directory.register(TENANT, ALICE);
        let (_, bob) = directory.register(TENANT, BOB);
        let router = SignalRouter::new(directory, store.clone(), store.clone());
        Self {
            router,
            store,
            alice,
            bob,
        }
    }

    async fn send(&self, from: &str, raw: &str) -> bool {
        self.router
            .handle(&SessionContext::new(TENANT, from), raw)
            .await
    }

    /// Alice calls Bob; Bob's notice is consumed.
    async fn offer(&mut self, call_id: &str) {
        let raw = format!(
            r#"{{"type":"OFFER","callId":"{call_id}","conversationId":{CONVERSATION},"isVideo":false}}"#
        );
        assert!(self.send(ALICE, &raw).await);
        self.bob.try_recv().expect("callee should get a notice");
    }

    fn inbox(&mut self, handle: &str) -> &mut UnboundedReceiver<String> {
        if handle == ALICE {
            &mut self.alice
        } else {
            &mut self.bob
        }
    }

    async fn outcomes(&self) -> Vec<CallOutcome> {
        self.store.call_outcomes(TENANT, CONVERSATION).await.unwrap()
    }

    /// Wait for detached outcome writes to land.
    async fn wait_for_outcomes(&self, count: usize) -> Vec<CallOutcome> {
        for _ in 0..100 {
            let outcomes = self.outcomes().await;
            if outcomes.len() >= count {
                return outcomes;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.outcomes().await
    }
}

fn counterpart(handle: &str) -> &'static str {
    if handle == ALICE { BOB } else { ALICE }
}

#[tokio::test]
async fn test_offer_with_one_counterparty_notifies_callee_once() {
    let mut h = Harness::new();
    assert!(
        h.send(
            ALICE,
            r#"{"type":"OFFER","callId":"p1","conversationId":7,"isVideo":true,"sdp":"v=0"}"#
        )
        .await
    );

    assert_eq!(h.router.registry().len(), 1);
    let call = h.router.registry().get("p1").unwrap();
    assert_eq!(call.caller_handle, ALICE);
    assert_eq!(call.callee_handle, BOB);

    let notice: IncomingCallNotice = serde_json::from_str(&h.bob.try_recv().unwrap()).unwrap();
    assert_eq!(notice.kind, IncomingCallNotice::TYPE);
    assert_eq!(notice.call_id, "p1");
    assert_eq!(notice.caller_name, "Alice");
    assert_eq!(notice.caller_user_id, 1);
    assert!(notice.is_video);

    assert!(h.bob.try_recv().is_err());
    assert!(h.alice.try_recv().is_err());
}

#[tokio::test]
async fn test_offer_with_no_counterparty_does_nothing() {
    let mut h = Harness::new();
    h.store
        .add_conversation(TENANT, 8, vec![ParticipantProfile::new(1, ALICE, "Alice")]);

    assert!(
        !h.send(
            ALICE,
            r#"{"type":"OFFER","callId":"p2","conversationId":8,"isVideo":false}"#
        )
        .await
    );
    assert!(h.router.registry().is_empty());
    assert!(h.bob.try_recv().is_err());
    assert!(h.alice.try_recv().is_err());
}

#[tokio::test]
async fn test_accept_then_negotiation_keeps_call_active() {
    let mut h = Harness::new();
    h.offer("p3").await;

    let accepted = r#"{"type":"ACCEPTED","callId":"p3"}"#;
    assert!(h.send(BOB, accepted).await);
    assert_eq!(h.alice.try_recv().unwrap(), accepted);
    assert!(h.router.registry().get("p3").is_some());

    let ice = r#"{"type":"ICE_CANDIDATE","callId":"p3","candidate":{"sdpMLineIndex":0}}"#;
    assert!(h.send(ALICE, ice).await);
    assert_eq!(h.bob.try_recv().unwrap(), ice);
    assert!(h.router.registry().get("p3").is_some());
    assert!(h.outcomes().await.is_empty());
}

#[tokio::test]
async fn test_terminal_signals_write_one_outcome() {
    let cases = [
        ("REJECTED", BOB, CallStatus::Rejected),
        ("CANCELLED", ALICE, CallStatus::Cancelled),
        ("ENDED", ALICE, CallStatus::Answered),
        ("TIMEOUT", ALICE, CallStatus::Missed),
    ];

    for (tag, sender, expected) in cases {
        let mut h = Harness::new();
        h.offer("p4").await;
        let started_at = h.router.registry().get("p4").unwrap().started_at;

        let raw = format!(r#"{{"type":"{tag}","callId":"p4"}}"#);
        let before = Utc::now();
        let routed = h
            .router
            .route(
                &SessionContext::new(TENANT, sender),
                callrelay::calls::InboundSignal::parse(raw.as_str()).unwrap(),
            )
            .await
            .unwrap();
        let Routed::Terminated {
            status, recording, ..
        } = routed
        else {
            panic!("{tag} should terminate the call");
        };
        recording.await.unwrap();
        let after = Utc::now();

        assert_eq!(status, expected);
        assert!(h.router.registry().get("p4").is_none(), "{tag}");

        let target = counterpart(sender);
        assert_eq!(h.inbox(target).try_recv().unwrap(), raw);
        assert!(h.inbox(target).try_recv().is_err());
        assert!(h.inbox(sender).try_recv().is_err());

        let outcomes = h.outcomes().await;
        assert_eq!(outcomes.len(), 1, "{tag}");
        let outcome = &outcomes[0];
        assert_eq!(outcome.status, expected);
        assert_eq!(outcome.call_id, "p4");
        assert_eq!(outcome.participants[0].user_id, 1);
        assert_eq!(outcome.participants[1].user_id, 2);
        for participant in &outcome.participants {
            assert_eq!(participant.joined_at, started_at);
            assert!(participant.left_at >= before && participant.left_at <= after);
        }
    }
}

#[tokio::test]
async fn test_unknown_call_id_has_no_effect() {
    let mut h = Harness::new();
    for tag in ["ACCEPTED", "REJECTED", "SDP_OFFER", "TOGGLE_VIDEO"] {
        let raw = format!(r#"{{"type":"{tag}","callId":"nobody"}}"#);
        assert!(!h.send(BOB, &raw).await, "{tag}");
    }
    assert!(h.alice.try_recv().is_err());
    assert!(h.bob.try_recv().is_err());
    assert!(h.outcomes().await.is_empty());
}

#[tokio::test]
async fn test_duplicate_reject_writes_single_outcome() {
    let mut h = Harness::new();
    h.offer("p6").await;

    let reject = r#"{"type":"REJECTED","callId":"p6"}"#;
    assert!(h.send(BOB, reject).await);
    assert!(!h.send(BOB, reject).await);

    assert_eq!(h.alice.try_recv().unwrap(), reject);
    assert!(h.alice.try_recv().is_err());

    let outcomes = h.wait_for_outcomes(1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(outcomes.len(), 1);
    assert_eq!(h.outcomes().await.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_terminal_signals_write_single_outcome() {
    let mut h = Harness::new();
    h.offer("race").await;

    let mut tasks = Vec::new();
    for i in 0..12 {
        let (sender, tag) = if i % 2 == 0 {
            (BOB, "REJECTED")
        } else {
            (ALICE, "CANCELLED")
        };
        tasks.push(h.router.submit(
            SessionContext::new(TENANT, sender),
            format!(r#"{{"type":"{tag}","callId":"race"}}"#),
        ));
    }

    let mut handled = 0;
    for task in tasks {
        if task.await.unwrap() {
            handled += 1;
        }
    }
    assert_eq!(handled, 1);
    assert!(h.router.registry().is_empty());

    let outcomes = h.wait_for_outcomes(1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(outcomes.len(), 1);
    assert_eq!(h.outcomes().await.len(), 1);

    let forwarded = h.alice.try_recv().is_ok() as usize + h.bob.try_recv().is_ok() as usize;
    assert_eq!(forwarded, 1);
}

#[tokio::test]
async fn test_every_signal_reaches_the_other_party() {
    let relayed: Vec<SignalType> = SignalType::ALL
        .iter()
        .copied()
        .filter(|kind| *kind != SignalType::Offer)
        .collect();

    for kind in relayed {
        for sender in [ALICE, BOB] {
            let mut h = Harness::new();
            h.offer("p7").await;

            let raw = format!(r#"{{"type":"{}","callId":"p7"}}"#, kind.tag_name());
            assert!(h.send(sender, &raw).await, "{kind} from {sender}");

            let target = counterpart(sender);
            assert_eq!(h.inbox(target).try_recv().unwrap(), raw, "{kind} from {sender}");
            assert!(h.inbox(sender).try_recv().is_err(), "{kind} from {sender}");
        }
    }
}
