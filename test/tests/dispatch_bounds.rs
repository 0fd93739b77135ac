use std::{
    cell::RefCell,
    rc::Rc,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use netsync::{
    DispatchError, Dispatcher, DispatcherConfig, ExecutionContext, Handler, HandlerError,
};
use netsync_shared::{DeliveryGuarantee, Opcode, PeerId};

const PEER: PeerId = PeerId::new(5);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn packet(opcode: Opcode, body: u16) -> Vec<u8> {
    let mut packet = vec![opcode.to_byte()];
    packet.extend_from_slice(&body.to_le_bytes());
    packet
}

fn body(payload: &[u8]) -> u16 {
    u16::from_le_bytes([payload[0], payload[1]])
}

#[test]
fn ten_thousand_messages_drain_three_hundred_per_tick() {
    init_logger();
    let mut dispatcher: Dispatcher<Vec<u16>> = Dispatcher::without_worker(DispatcherConfig::default());
    dispatcher
        .register_handler(
            Opcode::PlayerTransform,
            Handler::engine(|seen: &mut Vec<u16>, message| {
                seen.push(body(message.payload()));
                Ok(())
            }),
        )
        .unwrap();

    for index in 0..10_000u16 {
        dispatcher
            .ingest(PEER, &packet(Opcode::PlayerTransform, index), 0, DeliveryGuarantee::Unreliable)
            .unwrap();
    }

    let mut seen = Vec::new();
    assert_eq!(dispatcher.drain_engine_thread(&mut seen), 300);
    assert_eq!(dispatcher.engine_queue_len(), 9_700);

    let mut ticks = 1;
    while dispatcher.engine_queue_len() > 0 {
        assert!(dispatcher.drain_engine_thread(&mut seen) <= 300);
        ticks += 1;
    }

    assert_eq!(ticks, 34);
    assert_eq!(seen, (0..10_000u16).collect::<Vec<_>>());
    assert_eq!(dispatcher.stats().buffers_in_use, 0);
}

#[test]
fn second_registration_rejected_first_kept() {
    init_logger();
    let mut dispatcher: Dispatcher<Vec<&'static str>> =
        Dispatcher::without_worker(DispatcherConfig::default());

    dispatcher
        .register_handler(
            Opcode::DamageEvent,
            Handler::engine(|seen: &mut Vec<&'static str>, _| {
                seen.push("first");
                Ok(())
            }),
        )
        .unwrap();
    assert!(matches!(
        dispatcher.register_handler(
            Opcode::DamageEvent,
            Handler::engine(|seen: &mut Vec<&'static str>, _| {
                seen.push("second");
                Ok(())
            }),
        ),
        Err(DispatchError::DuplicateHandler { .. })
    ));
    // a different context for the same opcode is a separate slot
    dispatcher
        .register_handler(Opcode::DamageEvent, Handler::background(|_| Ok(())))
        .unwrap();

    dispatcher
        .ingest(PEER, &packet(Opcode::DamageEvent, 1), 0, DeliveryGuarantee::ReliableOrdered)
        .unwrap();
    let mut seen = Vec::new();
    dispatcher.drain_engine_thread(&mut seen);
    assert_eq!(seen, vec!["first"]);
}

#[test]
fn failing_handlers_do_not_stop_the_drain() {
    init_logger();
    let mut dispatcher: Dispatcher<u32> = Dispatcher::without_worker(DispatcherConfig::default());
    dispatcher
        .register_handler(
            Opcode::EnemyState,
            Handler::engine(|handled: &mut u32, message| {
                *handled += 1;
                match body(message.payload()) % 3 {
                    0 => panic!("corrupt enemy state"),
                    1 => Err(HandlerError::failed("unknown enemy")),
                    _ => Ok(()),
                }
            }),
        )
        .unwrap();

    for index in 0..30 {
        dispatcher
            .ingest(PEER, &packet(Opcode::EnemyState, index), 0, DeliveryGuarantee::ReliableOrdered)
            .unwrap();
    }

    let mut handled = 0;
    assert_eq!(dispatcher.drain_engine_thread(&mut handled), 30);
    assert_eq!(handled, 30);

    let stats = dispatcher.stats();
    assert_eq!(stats.handler_failures, 20);
    assert_eq!(stats.buffers_in_use, 0);
}

#[test]
fn background_handler_runs_off_engine_thread() {
    init_logger();
    let mut dispatcher: Dispatcher<()> = Dispatcher::new(DispatcherConfig::default()).unwrap();
    let engine_thread = thread::current().id();
    let handled = Arc::new(AtomicUsize::new(0));
    let off_thread = Arc::new(AtomicUsize::new(0));

    let handler_handled = Arc::clone(&handled);
    let handler_off_thread = Arc::clone(&off_thread);
    dispatcher
        .register_handler(
            Opcode::LootSync,
            Handler::background(move |_| {
                if thread::current().id() != engine_thread {
                    handler_off_thread.fetch_add(1, Ordering::SeqCst);
                }
                handler_handled.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        )
        .unwrap();

    let ingress = dispatcher.ingress();
    let producer = thread::spawn(move || {
        for index in 0..200 {
            ingress
                .ingest(PEER, &packet(Opcode::LootSync, index), 1, DeliveryGuarantee::Unreliable)
                .unwrap();
        }
    });
    producer.join().unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while handled.load(Ordering::SeqCst) < 200 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }

    assert_eq!(handled.load(Ordering::SeqCst), 200);
    assert_eq!(off_thread.load(Ordering::SeqCst), 200);
    assert!(dispatcher.shutdown().worker_joined);
}

#[test]
fn shutdown_discards_and_rejects() {
    init_logger();
    let mut dispatcher: Dispatcher<()> = Dispatcher::without_worker(DispatcherConfig::default());
    let ran = Rc::new(RefCell::new(0));
    let handler_ran = Rc::clone(&ran);
    dispatcher
        .register_handler(
            Opcode::LobbyState,
            Handler::engine(move |_: &mut (), _| {
                *handler_ran.borrow_mut() += 1;
                Ok(())
            }),
        )
        .unwrap();

    for index in 0..5 {
        dispatcher
            .ingest(PEER, &packet(Opcode::LobbyState, index), 0, DeliveryGuarantee::ReliableOrdered)
            .unwrap();
    }
    let ingress = dispatcher.ingress();

    let report = dispatcher.shutdown();
    assert_eq!(report.discarded, 5);
    assert_eq!(
        ingress.ingest(PEER, &packet(Opcode::LobbyState, 9), 0, DeliveryGuarantee::ReliableOrdered),
        Err(DispatchError::ShuttingDown)
    );
    assert_eq!(dispatcher.drain_engine_thread(&mut ()), 0);
    assert_eq!(*ran.borrow(), 0);
    assert_eq!(
        dispatcher.stats().engine_queue_len + dispatcher.stats().background_queue_len,
        0
    );
}

#[test]
fn routes_to_context_by_registration() {
    let mut dispatcher: Dispatcher<()> = Dispatcher::without_worker(DispatcherConfig::default());
    dispatcher
        .register_handler(Opcode::SceneVote, Handler::background(|_| Ok(())))
        .unwrap();

    assert_eq!(
        dispatcher.ingest(PEER, &packet(Opcode::SceneVote, 0), 0, DeliveryGuarantee::ReliableOrdered),
        Ok(ExecutionContext::Background)
    );
    assert_eq!(
        dispatcher.ingest(PEER, &packet(Opcode::Heartbeat, 0), 0, DeliveryGuarantee::Unreliable),
        Ok(ExecutionContext::EngineThread)
    );
    assert_eq!(dispatcher.drain_background_batch(), 1);
}
