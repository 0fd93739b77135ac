use proptest::prelude::*;

use netsync::{ReconcileConfig, ReconcileManager};
use netsync_shared::{Instant, OwnerId, SequenceNumber, Snapshot};
use netsync_test::TestReplicas;

const OWNER: OwnerId = OwnerId::new(1);
const MAXIMUM: f32 = 250.0;

/// `count` consecutive sequence numbers starting anywhere in the u16 range,
/// each paired with a distinct current value, delivered in shuffled order
fn shuffled_window() -> impl Strategy<Value = (u16, Vec<(u16, f32)>)> {
    (any::<u16>(), 1usize..40).prop_flat_map(|(start, count)| {
        let window: Vec<(u16, f32)> = (0..count)
            .map(|offset| {
                let offset = offset as u16;
                (start.wrapping_add(offset), f32::from(offset) + 1.0)
            })
            .collect();
        (Just(start), Just(window).prop_shuffle())
    })
}

fn newest_current(start: u16, window: &[(u16, f32)]) -> f32 {
    let newest = start.wrapping_add(window.len() as u16 - 1);
    window
        .iter()
        .find(|(sequence, _)| *sequence == newest)
        .map(|(_, current)| *current)
        .unwrap_or(f32::NAN)
}

proptest! {
    #[test]
    fn any_delivery_order_converges((start, window) in shuffled_window()) {
        let mut manager = ReconcileManager::new(ReconcileConfig::default());
        let mut replicas = TestReplicas::new();
        replicas.spawn(OWNER);
        let now = Instant::now();

        for (sequence, current) in &window {
            manager.receive_snapshot(
                OWNER,
                Snapshot::new(MAXIMUM, *current),
                SequenceNumber::new(*sequence),
                false,
                &now,
                &mut replicas,
            );
        }

        prop_assert_eq!(
            replicas.values(&OWNER),
            Some((MAXIMUM, newest_current(start, &window)))
        );
        prop_assert_eq!(
            manager.last_sequence(&OWNER),
            Some(SequenceNumber::new(start.wrapping_add(window.len() as u16 - 1)))
        );
    }

    #[test]
    fn pending_then_flush_converges((start, window) in shuffled_window()) {
        let mut manager = ReconcileManager::new(ReconcileConfig::default());
        let mut replicas = TestReplicas::new();
        let now = Instant::now();

        for (sequence, current) in &window {
            manager.receive_snapshot(
                OWNER,
                Snapshot::new(MAXIMUM, *current),
                SequenceNumber::new(*sequence),
                false,
                &now,
                &mut replicas,
            );
            prop_assert!(manager.pending_len() <= 1);
        }

        let replica = replicas.spawn(OWNER);
        prop_assert!(manager.flush_pending(OWNER, replica));
        prop_assert_eq!(
            replicas.values(&OWNER),
            Some((MAXIMUM, newest_current(start, &window)))
        );
    }

    #[test]
    fn newer_is_antisymmetric(a in any::<u16>(), b in any::<u16>()) {
        let a = SequenceNumber::new(a);
        let b = SequenceNumber::new(b);
        prop_assert!(!(a.is_newer_than(&b) && b.is_newer_than(&a)));
        if a != b && a.value().wrapping_sub(b.value()) != 0x8000 {
            prop_assert!(a.is_newer_than(&b) || b.is_newer_than(&a));
        }
    }
}
