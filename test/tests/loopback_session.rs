use std::{cell::RefCell, rc::Rc, sync::Arc, time::Duration};

use netsync::{
    ApplyOutcome, Handler, NetSync, OutgoingMessage, Priority, RouterEvent, SendOutcome, Session,
    SnapshotReplica, SyncConfig, Vitality,
};
use netsync_shared::{
    Instant, LoopbackEndpoint, MessageKind, Opcode, OwnerId, PacketChannel, PeerId,
    SequenceNumber, Snapshot,
};
use netsync_test::{pump, RecordingSender};

const HOST: PeerId = PeerId::new(1);
const CLIENT: PeerId = PeerId::new(2);
const CHAT: MessageKind = MessageKind::new(40);
const BOSS: OwnerId = OwnerId::new(900);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct Pair {
    host: NetSync<Vitality>,
    host_end: Arc<LoopbackEndpoint>,
    client: NetSync<Vitality>,
    client_end: Arc<LoopbackEndpoint>,
    now: Instant,
}

impl Pair {
    fn new() -> Self {
        let now = Instant::now();
        let (host_end, client_end) = PacketChannel::pair(HOST, CLIENT);
        let host_end = Arc::new(host_end);
        let client_end = Arc::new(client_end);
        let host =
            NetSync::without_worker(SyncConfig::default(), host_end.clone(), &now).unwrap();
        let client =
            NetSync::without_worker(SyncConfig::default(), client_end.clone(), &now).unwrap();
        Self {
            host,
            host_end,
            client,
            client_end,
            now,
        }
    }

    /// Advances one router poll interval and lets both sides exchange and
    /// process everything in flight
    fn step(&mut self) {
        self.now.add_duration(Duration::from_millis(50));
        for _ in 0..2 {
            self.host.tick(&self.now);
            pump(&self.client_end, &self.client.ingress()).unwrap();
            self.client.tick(&self.now);
            pump(&self.host_end, &self.host.ingress()).unwrap();
        }
    }
}

#[test]
fn routed_message_is_delivered_and_acked() {
    init_logger();
    let mut pair = Pair::new();
    let received = Rc::new(RefCell::new(Vec::new()));
    let handler_received = Rc::clone(&received);
    pair.client.register_route_handler(CHAT, move |inbound| {
        handler_received
            .borrow_mut()
            .push((inbound.peer, inbound.payload.clone()));
        Ok(())
    });

    let id = pair
        .host
        .broadcast(OutgoingMessage::new(CHAT, b"ready".as_slice()), Priority::High, true);
    pair.step();

    assert_eq!(*received.borrow(), vec![(HOST, b"ready".to_vec())]);
    assert_eq!(
        pair.host.take_router_events(),
        vec![RouterEvent::Delivered { id, peer: CLIENT }]
    );
    assert!(pair.host.session().router().is_idle());
}

#[test]
fn snapshot_waits_for_replica_then_applies() {
    init_logger();
    let mut pair = Pair::new();
    let boss = Vitality::new(500.0, 420.0);

    let outcome = pair.host.send_local_snapshot(BOSS, &boss, false, &pair.now);
    assert_eq!(outcome, Ok(SendOutcome::Sent(SequenceNumber::new(0))));
    pair.step();

    // the client has not spawned the boss yet
    assert!(pair.client.replica(&BOSS).is_none());
    assert_eq!(pair.client.reconcile_stats().pending_stored, 1);

    assert!(pair.client.spawn_replica(BOSS, Vitality::default()));
    let replica = pair.client.replica(&BOSS).unwrap();
    assert_eq!((replica.maximum(), replica.current()), (500.0, 420.0));
    assert_eq!(replica.owner(), Some(BOSS));
    assert_eq!(replica.display_refreshes(), 1);

    // later damage, sent after the cooldown
    pair.now.add_duration(Duration::from_millis(300));
    let boss = Vitality::new(500.0, 310.0);
    assert_eq!(
        pair.host.send_local_snapshot(BOSS, &boss, false, &pair.now),
        Ok(SendOutcome::Sent(SequenceNumber::new(1)))
    );
    pair.step();
    assert_eq!(pair.client.replica(&BOSS).map(|replica| replica.current()), Some(310.0));
}

#[test]
fn custom_opcode_handlers_get_the_session() {
    init_logger();
    let mut pair = Pair::new();
    pair.client
        .register_handler(
            Opcode::DamageEvent,
            Handler::engine(|session: &mut Session<Vitality>, message| {
                let damage = f32::from(message.payload()[0]);
                if let Some(replica) = session.replica_mut(&BOSS) {
                    let current = replica.current();
                    replica.set_current(current - damage);
                }
                Ok(())
            }),
        )
        .unwrap();
    pair.client.spawn_replica(BOSS, Vitality::new(100.0, 100.0));

    let ingress = pair.client.ingress();
    ingress
        .ingest(HOST, &[Opcode::DamageEvent.to_byte(), 30], 0, netsync_shared::DeliveryGuarantee::ReliableOrdered)
        .unwrap();
    let report = pair.client.tick(&pair.now);

    assert_eq!(report.processed, 1);
    assert_eq!(pair.client.replica(&BOSS).map(|replica| replica.current()), Some(70.0));
}

#[test]
fn direct_receive_and_despawn() {
    let wire = Arc::new(RecordingSender::new());
    let now = Instant::now();
    let mut sync: NetSync<Vitality> =
        NetSync::without_worker(SyncConfig::default(), wire.clone(), &now).unwrap();
    sync.spawn_replica(BOSS, Vitality::default());

    assert_eq!(
        sync.receive_snapshot(BOSS, Snapshot::new(80.0, 80.0), SequenceNumber::new(3), false),
        ApplyOutcome::Applied
    );
    assert!(sync.despawn_replica(&BOSS).is_some());
    assert_eq!(
        sync.receive_snapshot(BOSS, Snapshot::new(80.0, 20.0), SequenceNumber::new(1), false),
        ApplyOutcome::Pending { replaced: false }
    );
    assert!(wire.is_empty());
}

#[test]
fn respawn_replaces_existing_replica() {
    init_logger();
    let mut pair = Pair::new();
    pair.client.spawn_replica(BOSS, Vitality::new(100.0, 40.0));

    assert!(!pair.client.spawn_replica(BOSS, Vitality::new(250.0, 250.0)));
    let replica = pair.client.replica(&BOSS).unwrap();
    assert_eq!((replica.maximum(), replica.current()), (250.0, 250.0));
    assert_eq!(pair.client.session().replicas().len(), 1);

    // the next snapshot lands on the new replica
    let boss = Vitality::new(250.0, 200.0);
    pair.host.send_local_snapshot(BOSS, &boss, false, &pair.now).unwrap();
    pair.step();
    let replica = pair.client.replica(&BOSS).unwrap();
    assert_eq!(replica.current(), 200.0);
    assert_eq!(replica.display_refreshes(), 1);
}

#[test]
fn shutdown_stops_ingestion() {
    init_logger();
    let mut pair = Pair::new();
    let ingress = pair.client.ingress();
    ingress
        .ingest(HOST, &[Opcode::Heartbeat.to_byte()], 0, netsync_shared::DeliveryGuarantee::Unreliable)
        .unwrap();

    let report = pair.client.shutdown();
    assert_eq!(report.discarded, 1);
    assert!(!ingress.is_accepting());
    assert_eq!(pair.client.tick(&pair.now).processed, 0);
}
