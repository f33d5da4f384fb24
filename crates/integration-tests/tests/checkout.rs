//! Stock accounting across catalog, carts and orders.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::Barrier;

use techmart_core::{Email, OrderStatus, Price, ProductId};
use techmart_integration_tests::{add_product, test_shop};
use techmart_ledger::{Shop, ShopError};

fn user(name: &str) -> Email {
    Email::parse(&format!("{name}@example.com")).unwrap()
}

fn stock(shop: &Shop, id: &ProductId) -> u32 {
    shop.catalog().get(id).unwrap().stock
}

/// Every product's baseline equals current stock plus units held by
/// non-cancelled orders.
fn assert_conserved(shop: &Shop, baseline: &BTreeMap<ProductId, u32>) {
    let mut held: BTreeMap<&ProductId, u32> = BTreeMap::new();
    let orders = shop.orders().list_all().unwrap();
    for order in orders.iter().filter(|o| o.status != OrderStatus::Cancelled) {
        for (id, qty) in &order.items {
            *held.entry(id).or_default() += qty;
        }
    }
    for (id, original) in baseline {
        let on_hand = stock(shop, id);
        let in_orders = held.get(id).copied().unwrap_or(0);
        assert_eq!(
            *original,
            on_hand + in_orders,
            "{id}: {on_hand} on hand + {in_orders} in orders"
        );
    }
}

#[test]
fn test_checkout_and_cancel_scenario() {
    let shop = test_shop().unwrap();
    let p1 = add_product(&shop, "P1", 1_000, 5).unwrap();
    let alice = user("alice");

    shop.carts().add_item(&alice, &p1, 3).unwrap();
    assert_eq!(
        shop.carts().total(&alice).unwrap(),
        Price::parse("30.00").unwrap()
    );

    let order = shop.orders().checkout(&alice).unwrap();
    assert_eq!(stock(&shop, &p1), 2);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total, Price::parse("30.00").unwrap());
    assert_eq!(shop.carts().item_count(&alice).unwrap(), 0);

    shop.orders().cancel(order.id).unwrap();
    assert_eq!(stock(&shop, &p1), 5);
}

#[test]
fn test_concurrent_checkouts_cannot_oversell() {
    let shop = test_shop().unwrap();
    let p1 = add_product(&shop, "P1", 1_000, 5).unwrap();
    let buyers = [user("alice"), user("bob")];
    for buyer in &buyers {
        shop.carts().add_item(buyer, &p1, 3).unwrap();
    }

    let barrier = Barrier::new(buyers.len());
    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = buyers
            .iter()
            .map(|buyer| {
                let shop = shop.clone();
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    shop.orders().checkout(buyer)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let placed = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(placed, 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(ShopError::InsufficientStock {
            requested: 3,
            available: 2,
            ..
        })
    )));
    assert_eq!(stock(&shop, &p1), 2);
    assert_eq!(shop.orders().list_all().unwrap().len(), 1);
}

#[test]
fn test_many_concurrent_buyers_conserve_stock() {
    let shop = test_shop().unwrap();
    let p1 = add_product(&shop, "P1", 500, 20).unwrap();
    let p2 = add_product(&shop, "P2", 700, 7).unwrap();
    let baseline = BTreeMap::from([(p1.clone(), 20), (p2.clone(), 7)]);

    let buyers: Vec<Email> = (0..10).map(|i| user(&format!("buyer{i}"))).collect();
    for buyer in &buyers {
        shop.carts().add_item(buyer, &p1, 3).unwrap();
        shop.carts().add_item(buyer, &p2, 1).unwrap();
    }

    let barrier = Barrier::new(buyers.len());
    std::thread::scope(|scope| {
        for buyer in &buyers {
            let shop = shop.clone();
            let barrier = &barrier;
            scope.spawn(move || {
                barrier.wait();
                let _ = shop.orders().checkout(buyer);
            });
        }
    });

    // P1 allows six orders of 3; P2 allows seven of 1.
    let orders = shop.orders().list_all().unwrap();
    assert_eq!(orders.len(), 6);
    assert_eq!(stock(&shop, &p1), 2);
    assert_eq!(stock(&shop, &p2), 1);
    assert_conserved(&shop, &baseline);

    for order in orders.iter().take(3) {
        shop.orders().cancel(order.id).unwrap();
    }
    assert_conserved(&shop, &baseline);
    assert_eq!(stock(&shop, &p1), 11);
}

#[test]
fn test_failed_checkout_changes_nothing() {
    let shop = test_shop().unwrap();
    let cheap = add_product(&shop, "Cheap", 100, 10).unwrap();
    let scarce = add_product(&shop, "Scarce", 100, 2).unwrap();
    let alice = user("alice");

    shop.carts().add_item(&alice, &cheap, 4).unwrap();
    shop.carts().add_item(&alice, &scarce, 2).unwrap();
    shop.catalog().set_stock(&scarce, 1).unwrap();

    let err = shop.orders().checkout(&alice).unwrap_err();
    assert!(matches!(err, ShopError::InsufficientStock { .. }));
    assert_eq!(stock(&shop, &cheap), 10);
    assert_eq!(stock(&shop, &scarce), 1);
    assert!(shop.orders().list_all().unwrap().is_empty());
    assert_eq!(shop.carts().list(&alice).unwrap().len(), 2);
}

#[test]
fn test_cancel_then_checkout_again_restores_exactly() {
    let shop = test_shop().unwrap();
    let p1 = add_product(&shop, "P1", 1_000, 5).unwrap();
    let p2 = add_product(&shop, "P2", 250, 3).unwrap();
    let alice = user("alice");
    let baseline = BTreeMap::from([(p1.clone(), 5), (p2.clone(), 3)]);

    shop.carts().add_item(&alice, &p1, 2).unwrap();
    shop.carts().add_item(&alice, &p2, 3).unwrap();
    let first = shop.orders().checkout(&alice).unwrap();
    assert_conserved(&shop, &baseline);

    shop.orders().cancel(first.id).unwrap();
    assert_conserved(&shop, &baseline);

    shop.orders().reorder(&alice, first.id).unwrap();
    let second = shop.orders().checkout(&alice).unwrap();
    assert_eq!(second.items, first.items);
    assert_eq!(second.total, first.total);
    assert_eq!(stock(&shop, &p1), 3);
    assert_eq!(stock(&shop, &p2), 0);
    assert_conserved(&shop, &baseline);
}

#[test]
fn test_checkout_with_empty_cart() {
    let shop = test_shop().unwrap();
    assert_eq!(
        shop.orders().checkout(&user("nobody")),
        Err(ShopError::EmptyCart)
    );
}

#[test]
fn test_carts_are_private() {
    let shop = test_shop().unwrap();
    let p1 = add_product(&shop, "P1", 1_000, 5).unwrap();
    let alice = user("alice");
    let bob = user("bob");

    shop.carts().add_item(&alice, &p1, 2).unwrap();
    assert!(shop.carts().list(&bob).unwrap().is_empty());
    assert!(matches!(
        shop.carts().remove_item(&bob, &p1),
        Err(ShopError::NotFound { .. })
    ));

    shop.orders().checkout(&alice).unwrap();
    assert!(shop.orders().list_for_user(&bob).unwrap().is_empty());
}

#[test]
fn test_deleted_product_keeps_order_snapshot() {
    let shop = test_shop().unwrap();
    let p1 = add_product(&shop, "P1", 1_000, 5).unwrap();
    let p2 = add_product(&shop, "P2", 500, 5).unwrap();
    let alice = user("alice");

    shop.carts().add_item(&alice, &p1, 1).unwrap();
    shop.carts().add_item(&alice, &p2, 1).unwrap();
    let order = shop.orders().checkout(&alice).unwrap();

    shop.catalog().delete(&p2).unwrap();
    let kept = shop.orders().get(order.id).unwrap();
    assert_eq!(kept.items.len(), 2);
    assert_eq!(kept.total, Price::from_cents(1_500));

    // Cancelling restocks what still exists and ignores the rest.
    shop.orders().cancel(order.id).unwrap();
    assert_eq!(stock(&shop, &p1), 5);
}
