//! Concurrency tests: racing seller decisions and racing placements
//!
//! The engine is cloned across threads (storage is a shared handle); redb
//! serializes write transactions, so these tests assert the externally
//! visible guarantees: no oversell, exactly-once finalization, no double
//! refunds.

use market_engine::{EngineError, MarketEngine, Notification, OrderStatus, Product};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn new_engine() -> (MarketEngine, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let engine = MarketEngine::new(dir.path().join("market.redb")).expect("engine");
    (engine, dir)
}

fn seed_product(engine: &MarketEngine, id: &str, seller: &str, price: f64, stock: i32) {
    engine
        .upsert_product(&Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            price,
            stock_quantity: stock,
            seller_id: seller.to_string(),
            is_active: true,
        })
        .unwrap();
}

const ITEM_COUNT: usize = 8;

#[test]
fn concurrent_sibling_resolutions_finalize_exactly_once() {
    let (engine, _dir) = new_engine();

    // One order with ITEM_COUNT items, each owned by its own seller
    for i in 0..ITEM_COUNT {
        seed_product(&engine, &format!("p{i}"), &format!("seller-{i}"), 10.0, 10);
    }
    engine.add_funds("cust-1", 1000.0, "top up").unwrap();
    for i in 0..ITEM_COUNT {
        engine.add_to_cart("cust-1", &format!("p{i}"), 1).unwrap();
    }
    let order = engine.place_order("cust-1").unwrap().order;

    let mut rx = engine.subscribe();
    let engine = Arc::new(engine);

    // Every seller decides at the same moment; alternate approve/reject
    let mut handles = Vec::new();
    for (idx, item) in order.items.iter().enumerate() {
        let engine = Arc::clone(&engine);
        let item_id = item.item_id.clone();
        let seller_id = item.seller_id.clone();
        handles.push(thread::spawn(move || {
            if idx % 2 == 0 {
                engine.approve_item(&item_id, &seller_id).map(|_| ())
            } else {
                engine.reject_item(&item_id, &seller_id).map(|_| ())
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    // Exactly one final status write happened
    let resolved = engine.get_order(&order.order_id).unwrap();
    assert_eq!(resolved.status, OrderStatus::PartiallyApproved);
    assert!(engine.open_order_ids().unwrap().is_empty());

    // Exactly one customer outcome notification across all interleavings
    let mut outcome_count = 0;
    while let Ok(n) = rx.try_recv() {
        if n.is_customer_outcome() {
            outcome_count += 1;
        }
    }
    assert_eq!(outcome_count, 1);

    // Refunds: ITEM_COUNT/2 rejected items at 10.0 each, refunded once
    let expected_refund = (ITEM_COUNT / 2) as f64 * 10.0;
    let wallet = engine.wallet("cust-1").unwrap();
    assert_eq!(wallet.balance, 1000.0 - order.total_amount + expected_refund);
    assert!(resolved
        .items
        .iter()
        .all(|i| i.refund_issued == (i.status == market_engine::ItemStatus::Rejected)));
}

#[test]
fn racing_duplicate_decisions_apply_once() {
    let (engine, _dir) = new_engine();
    seed_product(&engine, "p1", "seller-a", 10.0, 5);
    engine.add_funds("cust-1", 100.0, "top up").unwrap();
    engine.add_to_cart("cust-1", "p1", 3).unwrap();
    let order = engine.place_order("cust-1").unwrap().order;
    let item_id = order.items[0].item_id.clone();

    let engine = Arc::new(engine);
    let successes = Arc::new(AtomicUsize::new(0));
    let duplicates = Arc::new(AtomicUsize::new(0));

    // Ten copies of the same rejection race each other
    let mut handles = Vec::new();
    for _ in 0..10 {
        let engine = Arc::clone(&engine);
        let successes = Arc::clone(&successes);
        let duplicates = Arc::clone(&duplicates);
        let item_id = item_id.clone();
        handles.push(thread::spawn(move || {
            match engine.reject_item(&item_id, "seller-a") {
                Ok(_) => successes.fetch_add(1, Ordering::SeqCst),
                Err(EngineError::AlreadyProcessed(_)) => {
                    duplicates.fetch_add(1, Ordering::SeqCst)
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(successes.load(Ordering::SeqCst), 1);
    assert_eq!(duplicates.load(Ordering::SeqCst), 9);

    // Stock restored exactly once (5 - 3 + 3), refund issued exactly once
    assert_eq!(engine.get_product("p1").unwrap().stock_quantity, 5);
    assert_eq!(engine.wallet("cust-1").unwrap().balance, 100.0);
    let refunds = engine
        .wallet_transactions("cust-1")
        .unwrap()
        .into_iter()
        .filter(|e| e.kind == market_engine::TransactionKind::Credit)
        .count();
    assert_eq!(refunds, 1);
}

#[test]
fn racing_placements_cannot_oversell() {
    let (engine, _dir) = new_engine();
    // Stock covers exactly one of the two competing orders
    seed_product(&engine, "p1", "seller-a", 10.0, 3);

    for customer in ["cust-a", "cust-b"] {
        engine.add_funds(customer, 100.0, "top up").unwrap();
        engine.add_to_cart(customer, "p1", 2).unwrap();
    }

    let engine = Arc::new(engine);
    let mut handles = Vec::new();
    for customer in ["cust-a", "cust-b"] {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || engine.place_order(customer)));
    }
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let placed = results.iter().filter(|r| r.is_ok()).count();
    let aborted = results
        .iter()
        .filter(|r| matches!(r, Err(EngineError::InsufficientStock(_))))
        .count();
    assert_eq!(placed, 1, "exactly one placement can win the stock");
    assert_eq!(aborted, 1);

    // The winner reserved 2, leaving 1; never negative
    assert_eq!(engine.get_product("p1").unwrap().stock_quantity, 1);

    // The loser's wallet was never debited
    let debits: usize = ["cust-a", "cust-b"]
        .iter()
        .map(|c| {
            engine
                .wallet_transactions(c)
                .unwrap()
                .into_iter()
                .filter(|e| e.kind == market_engine::TransactionKind::Debit)
                .count()
        })
        .sum();
    assert_eq!(debits, 1);
}

#[test]
fn interleaved_orders_resolve_independently() {
    let (engine, _dir) = new_engine();
    seed_product(&engine, "p1", "seller-a", 10.0, 100);
    seed_product(&engine, "p2", "seller-b", 5.0, 100);

    // Several customers place and resolve orders concurrently
    let mut order_ids = Vec::new();
    for i in 0..5 {
        let customer = format!("cust-{i}");
        engine.add_funds(&customer, 100.0, "top up").unwrap();
        engine.add_to_cart(&customer, "p1", 1).unwrap();
        engine.add_to_cart(&customer, "p2", 1).unwrap();
        order_ids.push(engine.place_order(&customer).unwrap().order);
    }

    let engine = Arc::new(engine);
    let mut handles = Vec::new();
    for order in &order_ids {
        for item in &order.items {
            let engine = Arc::clone(&engine);
            let item_id = item.item_id.clone();
            let seller_id = item.seller_id.clone();
            let approve = item.seller_id == "seller-a";
            handles.push(thread::spawn(move || {
                if approve {
                    engine.approve_item(&item_id, &seller_id).map(|_| ())
                } else {
                    engine.reject_item(&item_id, &seller_id).map(|_| ())
                }
            }));
        }
    }
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    // Every order resolved to the same mixed outcome, independently
    for order in &order_ids {
        let resolved = engine.get_order(&order.order_id).unwrap();
        assert_eq!(resolved.status, OrderStatus::PartiallyApproved);
    }
    assert!(engine.open_order_ids().unwrap().is_empty());

    // Each customer got the 5.0 refund for their rejected line
    for i in 0..5 {
        let wallet = engine.wallet(&format!("cust-{i}")).unwrap();
        assert_eq!(wallet.balance, 100.0 - 15.0 + 5.0);
    }
}

#[test]
fn notification_subscribers_see_seller_fanout() {
    let (engine, _dir) = new_engine();
    seed_product(&engine, "p1", "seller-a", 10.0, 10);
    seed_product(&engine, "p2", "seller-b", 5.0, 10);
    engine.add_funds("cust-1", 100.0, "top up").unwrap();
    engine.add_to_cart("cust-1", "p1", 1).unwrap();
    engine.add_to_cart("cust-1", "p2", 1).unwrap();

    let mut rx = engine.subscribe();
    engine.place_order("cust-1").unwrap();

    let mut sellers = Vec::new();
    while let Ok(n) = rx.try_recv() {
        if let Notification::SellerNewItems { seller_id, .. } = n {
            sellers.push(seller_id);
        }
    }
    sellers.sort();
    assert_eq!(sellers, vec!["seller-a".to_string(), "seller-b".to_string()]);
}
