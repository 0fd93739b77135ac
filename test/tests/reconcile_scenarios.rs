use netsync::{ApplyOutcome, ReconcileConfig, ReconcileManager};
use netsync_shared::{Instant, OwnerId, SequenceNumber, Snapshot};
use netsync_test::TestReplicas;

const OWNER_X: OwnerId = OwnerId::new(0xA11CE);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn receive(
    manager: &mut ReconcileManager,
    replicas: &mut TestReplicas,
    maximum: f32,
    current: f32,
    sequence: u16,
) -> ApplyOutcome {
    manager.receive_snapshot(
        OWNER_X,
        Snapshot::new(maximum, current),
        SequenceNumber::new(sequence),
        false,
        &Instant::now(),
        replicas,
    )
}

#[test]
fn snapshot_before_replica_then_stale_then_newer() {
    init_logger();
    let mut manager = ReconcileManager::new(ReconcileConfig::default());
    let mut replicas = TestReplicas::new();

    // arrives before the replica exists
    assert_eq!(
        receive(&mut manager, &mut replicas, 100.0, 80.0, 5),
        ApplyOutcome::Pending { replaced: false }
    );
    assert_eq!(replicas.values(&OWNER_X), None);

    // replica spawns
    let replica = replicas.spawn(OWNER_X);
    assert!(manager.flush_pending(OWNER_X, replica));
    assert_eq!(replicas.values(&OWNER_X), Some((100.0, 80.0)));

    assert_eq!(
        receive(&mut manager, &mut replicas, 100.0, 60.0, 4),
        ApplyOutcome::Stale
    );
    assert_eq!(replicas.values(&OWNER_X), Some((100.0, 80.0)));

    assert_eq!(
        receive(&mut manager, &mut replicas, 100.0, 60.0, 6),
        ApplyOutcome::Applied
    );
    assert_eq!(replicas.values(&OWNER_X), Some((100.0, 60.0)));
    assert_eq!(
        replicas.get(&OWNER_X).and_then(|replica| replica.owner()),
        Some(OWNER_X)
    );
}

#[test]
fn invalid_snapshot_never_reaches_replica() {
    init_logger();
    let mut manager = ReconcileManager::new(ReconcileConfig::default());
    let mut replicas = TestReplicas::new();
    replicas.spawn(OWNER_X);

    receive(&mut manager, &mut replicas, 100.0, 50.0, 1);
    for (maximum, sequence) in [(0.0, 2), (-10.0, 3)] {
        assert_eq!(
            receive(&mut manager, &mut replicas, maximum, 0.0, sequence),
            ApplyOutcome::Quarantined
        );
    }
    // forced invalid values are quarantined too
    assert_eq!(
        manager.receive_snapshot(
            OWNER_X,
            Snapshot::invalid(),
            SequenceNumber::new(4),
            true,
            &Instant::now(),
            &mut replicas,
        ),
        ApplyOutcome::Quarantined
    );

    assert_eq!(replicas.values(&OWNER_X), Some((100.0, 50.0)));
    assert_eq!(manager.stats().quarantined, 3);
    assert_eq!(
        manager.quarantined(&OWNER_X).map(|quarantined| quarantined.sequence),
        Some(SequenceNumber::new(4))
    );
    // quarantined sequences do not block later valid snapshots
    assert_eq!(
        receive(&mut manager, &mut replicas, 100.0, 40.0, 2),
        ApplyOutcome::Applied
    );
}

#[test]
fn out_of_order_pending_keeps_only_newest() {
    init_logger();
    let mut manager = ReconcileManager::new(ReconcileConfig::default());
    let mut replicas = TestReplicas::new();

    for sequence in [3u16, 9, 1, 7, 12, 11, 2] {
        receive(&mut manager, &mut replicas, 50.0, f32::from(sequence), sequence);
        assert_eq!(manager.pending_len(), 1);
    }
    assert_eq!(
        manager.pending(&OWNER_X).map(|pending| pending.snapshot.sequence),
        Some(SequenceNumber::new(12))
    );

    let replica = replicas.spawn(OWNER_X);
    assert!(manager.flush_pending(OWNER_X, replica));
    assert_eq!(replicas.values(&OWNER_X), Some((50.0, 12.0)));

    let replica = replicas.spawn(OWNER_X);
    assert!(!manager.flush_pending(OWNER_X, replica));
    assert_eq!(manager.stats().applied, 1);
}

#[test]
fn owners_are_independent() {
    let mut manager = ReconcileManager::new(ReconcileConfig::default());
    let mut replicas = TestReplicas::new();
    let other = OwnerId::new(2);
    replicas.spawn(OWNER_X);
    replicas.spawn(other);

    receive(&mut manager, &mut replicas, 100.0, 10.0, 40);
    assert_eq!(
        manager.receive_snapshot(
            other,
            Snapshot::new(30.0, 20.0),
            SequenceNumber::new(1),
            false,
            &Instant::now(),
            &mut replicas,
        ),
        ApplyOutcome::Applied
    );

    assert_eq!(replicas.values(&OWNER_X), Some((100.0, 10.0)));
    assert_eq!(replicas.values(&other), Some((30.0, 20.0)));
}
