//! The per-room coordination loop.
//!
//! Every membership change and every broadcast for a room travels through a
//! single FIFO event queue consumed by one task, so the room observes a strict
//! total order of events consistent with their arrival order. The loop never
//! awaits anything on behalf of a single member: delivery is a non-blocking
//! enqueue, and a member whose queue is full is evicted on the spot.

use std::collections::HashMap;

use tokio::sync::{
    mpsc::{self, error::TrySendError},
    oneshot,
};

use crate::domain::{ConnectionId, Message, RoomId};

use super::{HubError, Member, MemberInfo};

/// Events accepted by the coordination loop.
#[derive(Debug)]
enum HubEvent {
    Register(Member),
    Unregister(ConnectionId),
    Broadcast(Message),
    Inspect(oneshot::Sender<Vec<MemberInfo>>),
}

/// Handle to a running hub.
///
/// Cloning is cheap; all clones feed the same coordination loop.
#[derive(Debug, Clone)]
pub struct Hub {
    room_id: RoomId,
    events: mpsc::Sender<HubEvent>,
}

impl Hub {
    /// Create a hub for `room_id` and spawn its coordination loop.
    ///
    /// Must be called from within a Tokio runtime. The loop is running by the
    /// time the handle is returned, so callers may register immediately.
    pub fn start(room_id: RoomId, intake_capacity: usize) -> Self {
        let (events, receiver) = mpsc::channel(intake_capacity.max(1));
        let coordinator = Coordinator {
            room_id: room_id.clone(),
            events: receiver,
            members: HashMap::new(),
        };
        tokio::spawn(coordinator.run());
        tracing::info!("Hub for room '{}' started", room_id);

        Self { room_id, events }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Add a member. No history is replayed to it.
    pub async fn register(&self, member: Member) -> Result<(), HubError> {
        self.send(HubEvent::Register(member)).await
    }

    /// Remove a member and close its outbound queue. Unknown ids are ignored.
    pub async fn unregister(&self, connection_id: ConnectionId) -> Result<(), HubError> {
        self.send(HubEvent::Unregister(connection_id)).await
    }

    /// Fan `message` out to every member, the sender included.
    pub async fn broadcast(&self, message: Message) -> Result<(), HubError> {
        self.send(HubEvent::Broadcast(message)).await
    }

    /// Snapshot of the current membership, taken inside the loop.
    pub async fn members(&self) -> Result<Vec<MemberInfo>, HubError> {
        let (reply, response) = oneshot::channel();
        self.send(HubEvent::Inspect(reply)).await?;
        response
            .await
            .map_err(|_| HubError::Closed(self.room_id.clone()))
    }

    /// A handle that does not keep the hub's intake open.
    pub fn downgrade(&self) -> WeakHub {
        WeakHub {
            room_id: self.room_id.clone(),
            events: self.events.downgrade(),
        }
    }

    async fn send(&self, event: HubEvent) -> Result<(), HubError> {
        self.events
            .send(event)
            .await
            .map_err(|_| HubError::Closed(self.room_id.clone()))
    }
}

/// Non-owning reference to a hub, held by connections.
#[derive(Debug, Clone)]
pub struct WeakHub {
    room_id: RoomId,
    events: mpsc::WeakSender<HubEvent>,
}

impl WeakHub {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn upgrade(&self) -> Option<Hub> {
        self.events.upgrade().map(|events| Hub {
            room_id: self.room_id.clone(),
            events,
        })
    }
}

/// Sole owner of a room's membership set.
struct Coordinator {
    room_id: RoomId,
    events: mpsc::Receiver<HubEvent>,
    members: HashMap<ConnectionId, Member>,
}

impl Coordinator {
    async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            self.handle(event);
        }
        tracing::info!("Hub for room '{}' stopped", self.room_id);
    }

    fn handle(&mut self, event: HubEvent) {
        match event {
            HubEvent::Register(member) => {
                tracing::info!(
                    "Connection {} registered to room '{}' ({} members)",
                    member.id(),
                    self.room_id,
                    self.members.len() + 1
                );
                self.members.insert(member.id(), member);
            }
            HubEvent::Unregister(connection_id) => {
                // Dropping the member closes its outbound queue.
                if self.members.remove(&connection_id).is_some() {
                    tracing::info!(
                        "Connection {} unregistered from room '{}'",
                        connection_id,
                        self.room_id
                    );
                }
            }
            HubEvent::Broadcast(message) => self.broadcast(message),
            HubEvent::Inspect(reply) => {
                let snapshot = self.members.values().map(Member::info).collect();
                let _ = reply.send(snapshot);
            }
        }
    }

    fn broadcast(&mut self, message: Message) {
        let mut evicted = Vec::new();

        for (connection_id, member) in &self.members {
            match member.try_deliver(message.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        "Outbound queue of connection {} in room '{}' is full, evicting",
                        connection_id,
                        self.room_id
                    );
                    evicted.push(*connection_id);
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(
                        "Outbound queue of connection {} in room '{}' is closed, removing",
                        connection_id,
                        self.room_id
                    );
                    evicted.push(*connection_id);
                }
            }
        }

        for connection_id in evicted {
            self.members.remove(&connection_id);
        }

        tracing::debug!(
            "Broadcasted {} message from '{}' to {} members of room '{}'",
            message.kind,
            message.sender_id,
            self.members.len(),
            self.room_id
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, Identity, MessageKind, Role, UserId};
    use chrono::Utc;
    use std::collections::HashSet;
    use tokio::sync::mpsc::error::TryRecvError;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - ハブの調停ループによるメンバー管理とブロードキャスト
    // - 送信キューが詰まったメンバーの強制切断（バックプレッシャー）
    // - unregister の冪等性
    //
    // 【なぜこのテストが必要か】
    // - メンバー集合はループ内でのみ変更されるため、イベント順序が結果を決める
    // - 遅いコネクションがルーム全体を止めないことを保証する必要がある
    // ========================================

    const INTAKE: usize = 64;

    fn room(name: &str) -> RoomId {
        RoomId::new(name.to_string()).unwrap()
    }

    fn identity(user: &str) -> Identity {
        Identity::new(
            UserId::new(user.to_string()).unwrap(),
            DisplayName::new(user.to_string()).unwrap(),
            Role::Member,
        )
    }

    fn chat(room_id: &RoomId, from: &str, content: &str) -> Message {
        Message::from_client(
            MessageKind::Chat,
            content.to_string(),
            &identity(from),
            room_id.clone(),
            Utc::now(),
        )
    }

    fn member(user: &str, capacity: usize) -> (Member, mpsc::Receiver<Message>) {
        Member::new(ConnectionId::generate(), &identity(user), capacity)
    }

    fn ids(members: &[MemberInfo]) -> HashSet<ConnectionId> {
        members.iter().map(|m| m.connection_id).collect()
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_member_including_sender() {
        // テスト項目: ブロードキャストは送信者自身を含む全メンバーに届く
        // given (前提条件):
        let room_id = room("r1");
        let hub = Hub::start(room_id.clone(), INTAKE);
        let (alice, mut alice_rx) = member("alice", 8);
        let (bob, mut bob_rx) = member("bob", 8);
        hub.register(alice).await.unwrap();
        hub.register(bob).await.unwrap();

        // when (操作): alice が発言
        hub.broadcast(chat(&room_id, "alice", "hi")).await.unwrap();

        // then (期待する結果): alice 自身にもエコーが返る
        let echoed = alice_rx.recv().await.unwrap();
        let received = bob_rx.recv().await.unwrap();
        assert_eq!(echoed.content, "hi");
        assert_eq!(received.content, "hi");
        assert_eq!(received.sender_id.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_new_member_receives_no_history() {
        // テスト項目: 後から参加したメンバーには過去のメッセージが再送されない
        // given (前提条件):
        let room_id = room("r1");
        let hub = Hub::start(room_id.clone(), INTAKE);
        let (alice, mut alice_rx) = member("alice", 8);
        hub.register(alice).await.unwrap();
        hub.broadcast(chat(&room_id, "alice", "earlier")).await.unwrap();

        // when (操作): carol が後から参加し、その後に新しいメッセージが流れる
        let (carol, mut carol_rx) = member("carol", 8);
        hub.register(carol).await.unwrap();
        hub.broadcast(chat(&room_id, "alice", "later")).await.unwrap();

        // then (期待する結果): carol は後のメッセージだけを受け取る
        assert_eq!(alice_rx.recv().await.unwrap().content, "earlier");
        assert_eq!(carol_rx.recv().await.unwrap().content, "later");
        hub.members().await.unwrap();
        assert_eq!(carol_rx.try_recv().unwrap_err(), TryRecvError::Empty);
    }

    #[tokio::test]
    async fn test_unregister_closes_outbound_queue() {
        // テスト項目: unregister するとメンバーの送信キューが閉じられる
        // given (前提条件):
        let hub = Hub::start(room("r1"), INTAKE);
        let (alice, mut alice_rx) = member("alice", 8);
        let alice_id = alice.id();
        hub.register(alice).await.unwrap();

        // when (操作):
        hub.unregister(alice_id).await.unwrap();

        // then (期待する結果): 受信側は None を受け取り、メンバーから外れている
        assert!(alice_rx.recv().await.is_none());
        assert!(hub.members().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        // テスト項目: 二重の unregister や未登録 ID の unregister は何もしない
        // given (前提条件):
        let hub = Hub::start(room("r1"), INTAKE);
        let (alice, _alice_rx) = member("alice", 8);
        let (bob, _bob_rx) = member("bob", 8);
        let alice_id = alice.id();
        let bob_id = bob.id();
        hub.register(alice).await.unwrap();
        hub.register(bob).await.unwrap();

        // when (操作):
        hub.unregister(alice_id).await.unwrap();
        hub.unregister(alice_id).await.unwrap();
        hub.unregister(ConnectionId::generate()).await.unwrap();

        // then (期待する結果): bob だけが残る
        let members = hub.members().await.unwrap();
        assert_eq!(ids(&members), HashSet::from([bob_id]));
    }

    #[tokio::test]
    async fn test_full_queue_evicts_only_that_member() {
        // テスト項目: 送信キューが満杯のメンバーだけが切断され、他は受信を続ける
        // given (前提条件): stalled は容量 1 で一度も読まない
        let room_id = room("r1");
        let hub = Hub::start(room_id.clone(), INTAKE);
        let (stalled, mut stalled_rx) = member("stalled", 1);
        let (healthy, mut healthy_rx) = member("healthy", 8);
        let stalled_id = stalled.id();
        let healthy_id = healthy.id();
        hub.register(stalled).await.unwrap();
        hub.register(healthy).await.unwrap();

        // when (操作): 2 件ブロードキャストする
        hub.broadcast(chat(&room_id, "healthy", "one")).await.unwrap();
        hub.broadcast(chat(&room_id, "healthy", "two")).await.unwrap();

        // then (期待する結果):
        let members = hub.members().await.unwrap();
        assert_eq!(ids(&members), HashSet::from([healthy_id]));
        assert!(!ids(&members).contains(&stalled_id));

        // stalled は 1 件目だけを受け取り、その後キューが閉じられる
        assert_eq!(stalled_rx.recv().await.unwrap().content, "one");
        assert!(stalled_rx.recv().await.is_none());

        // healthy は両方受け取る
        assert_eq!(healthy_rx.recv().await.unwrap().content, "one");
        assert_eq!(healthy_rx.recv().await.unwrap().content, "two");
    }

    #[tokio::test]
    async fn test_stalled_member_does_not_delay_others() {
        // テスト項目: 読まないメンバーがいても他メンバーへの配信が滞らない
        // given (前提条件):
        let room_id = room("r1");
        let hub = Hub::start(room_id.clone(), INTAKE);
        let (stalled, _stalled_rx) = member("stalled", 2);
        let (healthy, mut healthy_rx) = member("healthy", 128);
        hub.register(stalled).await.unwrap();
        hub.register(healthy).await.unwrap();

        // when (操作): stalled のキュー容量を大きく超える件数を流す
        let started = tokio::time::Instant::now();
        for i in 0..100 {
            hub.broadcast(chat(&room_id, "healthy", &i.to_string()))
                .await
                .unwrap();
        }
        for i in 0..100 {
            let message = healthy_rx.recv().await.unwrap();
            assert_eq!(message.content, i.to_string());
        }

        // then (期待する結果): ブロッキングなしで短時間に配信が終わる
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
        assert_eq!(hub.members().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_member_whose_receiver_dropped_is_removed() {
        // テスト項目: 受信側が破棄されたメンバーは次のブロードキャストで取り除かれる
        // given (前提条件):
        let room_id = room("r1");
        let hub = Hub::start(room_id.clone(), INTAKE);
        let (gone, gone_rx) = member("gone", 8);
        hub.register(gone).await.unwrap();
        drop(gone_rx);

        // when (操作):
        hub.broadcast(chat(&room_id, "someone", "hello")).await.unwrap();

        // then (期待する結果):
        assert!(hub.members().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_producers_converge_to_expected_membership() {
        // テスト項目: 複数の並行プロデューサからの register/unregister 後、
        //            メンバー集合は「登録済みかつ未解除」の集合と一致する
        // given (前提条件):
        let room_id = room("r1");
        let hub = Hub::start(room_id.clone(), INTAKE);

        // when (操作): 8 タスクがそれぞれ 10 件登録し、偶数番目だけ解除する
        let mut tasks = Vec::new();
        for task in 0..8 {
            let hub = hub.clone();
            let room_id = room_id.clone();
            tasks.push(tokio::spawn(async move {
                let mut kept = Vec::new();
                let mut receivers = Vec::new();
                for i in 0..10 {
                    let (m, rx) = member(&format!("user-{task}-{i}"), 128);
                    let id = m.id();
                    hub.register(m).await.unwrap();
                    hub.broadcast(chat(&room_id, "producer", "tick")).await.unwrap();
                    if i % 2 == 0 {
                        hub.unregister(id).await.unwrap();
                    } else {
                        kept.push(id);
                    }
                    receivers.push(rx);
                }
                (kept, receivers)
            }));
        }

        let mut expected = HashSet::new();
        let mut receivers = Vec::new();
        for task in tasks {
            let (kept, rx) = task.await.unwrap();
            expected.extend(kept);
            receivers.extend(rx);
        }

        // then (期待する結果):
        let members = hub.members().await.unwrap();
        assert_eq!(ids(&members), expected);
        assert_eq!(members.len(), 40);
    }

    #[tokio::test]
    async fn test_weak_hub_upgrades_while_hub_is_alive() {
        // テスト項目: WeakHub はハブが生きている間 upgrade でき、同じループにつながる
        // given (前提条件):
        let hub = Hub::start(room("r1"), INTAKE);
        let weak = hub.downgrade();
        let (alice, _alice_rx) = member("alice", 8);

        // when (操作):
        let upgraded = weak.upgrade().unwrap();
        upgraded.register(alice).await.unwrap();

        // then (期待する結果):
        assert_eq!(weak.room_id().as_str(), "r1");
        assert_eq!(hub.members().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_weak_hub_does_not_keep_hub_alive() {
        // テスト項目: 強参照がすべて破棄されると WeakHub は upgrade できない
        // given (前提条件):
        let hub = Hub::start(room("r1"), INTAKE);
        let weak = hub.downgrade();

        // when (操作):
        drop(hub);

        // then (期待する結果):
        assert!(weak.upgrade().is_none());
    }
}
