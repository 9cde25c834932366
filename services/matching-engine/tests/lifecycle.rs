//! Room lifecycle tests
//!
//! End-to-end flows through the public engine API: pairing order, room
//! creation and teardown, cascading reassignment and restart.

use matching_engine::{EngineError, MatchingEngine};
use persistence::{EntityStore, StoreConfig};
use proptest::prelude::*;
use tempfile::TempDir;
use types::ids::{RoomId, UserId};
use types::search::SearchQueue;

fn memory_engine() -> MatchingEngine {
    MatchingEngine::open(&StoreConfig::in_memory()).unwrap()
}

fn uid(id: i64) -> UserId {
    UserId::new(id)
}

/// Engine over a store whose queue already holds `waiting`, head first.
fn engine_with_queue(waiting: &[i64]) -> MatchingEngine {
    let store = EntityStore::open(&StoreConfig::in_memory()).unwrap();
    let queue: SearchQueue = waiting.iter().copied().map(uid).collect();
    store.put_search_queue(&queue).unwrap();
    MatchingEngine::from_store(store)
}

fn room_of(engine: &MatchingEngine, id: i64) -> Option<RoomId> {
    engine.get_user(uid(id)).unwrap().current_room
}

#[test]
fn test_two_user_scenario() {
    let engine = memory_engine();

    assert!(engine.search(uid(1)).unwrap().is_empty());
    assert_eq!(engine.search_queue().unwrap().iter().collect::<Vec<_>>(), vec![uid(1)]);

    let matched = engine.search(uid(2)).unwrap();
    assert_eq!(matched, vec![uid(1)]);
    assert!(engine.search_queue().unwrap().is_empty());

    let room = engine.add_room(&[uid(1), uid(2)]).unwrap();
    assert_eq!(room.get(), 1);
    assert_eq!(room_of(&engine, 1), Some(room));
    assert_eq!(room_of(&engine, 2), Some(room));
    assert_eq!(engine.get_room(room).unwrap().members, vec![uid(1), uid(2)]);

    assert_eq!(engine.del_room(room).unwrap(), vec![uid(1), uid(2)]);
    assert!(matches!(engine.get_room(room), Err(EngineError::RoomNotFound(r)) if r == room));
    assert_eq!(room_of(&engine, 1), None);
    assert_eq!(room_of(&engine, 2), None);
}

#[test]
fn test_queue_fairness() {
    let engine = engine_with_queue(&[1, 2, 3, 4, 5]);

    assert_eq!(engine.search(uid(6)).unwrap(), vec![uid(1)]);
    assert!(!engine.is_searching(uid(6)).unwrap());
    assert_eq!(
        engine.search_queue().unwrap().iter().collect::<Vec<_>>(),
        vec![uid(2), uid(3), uid(4), uid(5)]
    );

    assert_eq!(engine.search(uid(7)).unwrap(), vec![uid(2)]);
    assert_eq!(
        engine.search_queue().unwrap().iter().collect::<Vec<_>>(),
        vec![uid(3), uid(4), uid(5)]
    );
}

#[test]
fn test_second_search_from_same_user_is_rejected() {
    let engine = memory_engine();
    engine.search(uid(1)).unwrap();

    let err = engine.search(uid(1)).unwrap_err();
    assert!(matches!(err, EngineError::AlreadySearching(u) if u == uid(1)));
    assert!(!err.is_fatal());
    assert_eq!(engine.search_queue().unwrap().len(), 1);
}

#[test]
fn test_unsearch_then_search_requeues_at_tail() {
    let engine = memory_engine();
    engine.search(uid(1)).unwrap();
    engine.unsearch(uid(1)).unwrap();
    assert!(!engine.is_searching(uid(1)).unwrap());

    // Queue is empty again, so uid(2) waits instead of pairing
    assert!(engine.search(uid(2)).unwrap().is_empty());
    assert_eq!(engine.search(uid(1)).unwrap(), vec![uid(2)]);
}

#[test]
fn test_cascading_reassignment() {
    let engine = memory_engine();
    let first = engine.add_room(&[uid(1), uid(2), uid(3)]).unwrap();
    let second = engine.add_room(&[uid(1), uid(4)]).unwrap();

    assert!(!engine.is_room_exist(first).unwrap());
    assert!(engine.is_room_exist(second).unwrap());
    assert_eq!(room_of(&engine, 1), Some(second));
    assert_eq!(room_of(&engine, 2), None);
    assert_eq!(room_of(&engine, 3), None);
    assert_eq!(room_of(&engine, 4), Some(second));
}

#[test]
fn test_room_ids_are_never_reused() {
    let engine = memory_engine();
    let first = engine.add_room(&[uid(1), uid(2)]).unwrap();
    engine.del_room(first).unwrap();
    let second = engine.add_room(&[uid(1), uid(2)]).unwrap();
    assert!(second.get() > first.get());
}

#[test]
fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::new(dir.path());

    let room = {
        let engine = MatchingEngine::open(&config).unwrap();
        engine.search(uid(10)).unwrap();
        let room = engine.add_room(&[uid(20), uid(30)]).unwrap();
        engine.close().unwrap();
        room
    };

    let engine = MatchingEngine::open(&config).unwrap();
    assert!(engine.is_searching(uid(10)).unwrap());
    assert_eq!(engine.get_room(room).unwrap().members, vec![uid(20), uid(30)]);
    assert_eq!(room_of(&engine, 20), Some(room));
    assert_eq!(engine.room_counter().unwrap(), room.get());

    let next = engine.add_room(&[uid(40)]).unwrap();
    assert_eq!(next.get(), room.get() + 1);
    engine.close().unwrap();
}

#[test]
fn test_close_then_reopen_repeatedly() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::new(dir.path());

    for round in 1..=20u64 {
        let engine = MatchingEngine::open(&config).unwrap();
        let room = engine.add_room(&[uid(round as i64)]).unwrap();
        assert_eq!(room.get(), round);
        engine.close().unwrap();
    }
}

proptest! {
    #[test]
    fn prop_pairs_follow_arrival_order(waiting in 1i64..20, arrivals in 1i64..20) {
        let queued: Vec<i64> = (0..waiting).collect();
        let engine = engine_with_queue(&queued);

        let pairs = arrivals.min(waiting);
        for n in 0..pairs {
            let newcomer = uid(1_000 + n);
            prop_assert_eq!(engine.search(newcomer).unwrap(), vec![uid(n)]);
        }
        prop_assert_eq!(
            engine.search_queue().unwrap().iter().collect::<Vec<_>>(),
            (pairs..waiting).map(uid).collect::<Vec<_>>()
        );
    }
}
