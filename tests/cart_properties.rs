//! Cart store behaviour seen from outside the crate.
//!
//! Scenario used throughout: a vase at 89.00 and a mug at 32.00.

use std::sync::{Arc, Mutex, PoisonError};

use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use artisan::prelude::*;

fn vase() -> Product {
    Product::new("1", "Ceramic Vase", Money::from_minor(8_900, USD)).with_category("Home Decor")
}

fn mug() -> Product {
    Product::new("5", "Ceramic Coffee Mug", Money::from_minor(3_200, USD))
        .with_category("Tableware")
}

fn quantities(store: &CartStore) -> Vec<(String, u32)> {
    store
        .items()
        .iter()
        .map(|item| (item.id().to_string(), item.quantity()))
        .collect()
}

#[test]
fn adding_a_new_product_creates_one_line() -> TestResult {
    let store = CartStore::new(USD);

    store.add_item(&vase())?;

    assert_eq!(store.item_count(), 1);
    assert_eq!(quantities(&store), [("1".to_string(), 1)]);

    Ok(())
}

#[test]
fn adding_an_existing_product_increments_without_duplicating() -> TestResult {
    let store = CartStore::new(USD);

    store.add_item(&vase())?;
    store.add_item(&vase())?;
    store.add_item(&vase())?;

    assert_eq!(store.len(), 1);
    assert_eq!(quantities(&store), [("1".to_string(), 3)]);

    Ok(())
}

#[test]
fn non_positive_quantity_matches_remove() -> TestResult {
    let removed = CartStore::new(USD);
    removed.add_item(&vase())?;
    removed.add_item(&mug())?;
    removed.remove_item(&vase().id);

    for quantity in [0, -3] {
        let updated = CartStore::new(USD);
        updated.add_item(&vase())?;
        updated.add_item(&mug())?;

        updated.update_quantity(&vase().id, quantity);

        assert_eq!(updated.items(), removed.items(), "quantity {quantity}");
    }

    Ok(())
}

#[test]
fn removing_an_absent_product_changes_nothing() -> TestResult {
    let store = CartStore::new(USD);
    store.add_item(&vase())?;

    let items = store.items();
    let subtotal = store.subtotal()?;

    let change = store.remove_item(&ProductId::new("absent"));

    assert_eq!(
        change,
        CartChange::Unchanged {
            product_id: ProductId::new("absent")
        }
    );
    assert_eq!(store.items(), items);
    assert_eq!(store.subtotal()?, subtotal);

    Ok(())
}

#[test]
fn subtotal_progression() -> TestResult {
    let store = CartStore::new(USD);
    let ten = Product::new("a", "Ten", Money::from_minor(1_000, USD));
    let five_fifty = Product::new("b", "Five fifty", Money::from_minor(550, USD));

    assert_eq!(store.subtotal()?, Money::from_minor(0, USD));

    store.add_item(&ten)?;
    store.add_item(&ten)?;

    assert_eq!(store.subtotal()?, Money::from_minor(2_000, USD));

    store.add_item(&five_fifty)?;

    assert_eq!(store.subtotal()?, Money::from_minor(2_550, USD));

    Ok(())
}

#[test]
fn item_count_sums_quantities_not_lines() -> TestResult {
    let store = CartStore::new(USD);

    store.add_item(&vase())?;
    store.add_item(&mug())?;
    store.update_quantity(&vase().id, 2);
    store.update_quantity(&mug().id, 3);

    assert_eq!(store.len(), 2);
    assert_eq!(store.item_count(), 5);

    Ok(())
}

#[test]
fn items_is_a_detached_snapshot() -> TestResult {
    let store = CartStore::new(USD);
    store.add_item(&vase())?;

    let first = store.items();
    let second = store.items();

    assert_eq!(first, second);

    let mut mutated = store.items();
    mutated.push(CartLineItem::new(mug()));
    mutated.clear();

    assert_eq!(store.items(), first);

    Ok(())
}

#[test]
fn vase_and_mug_scenario() -> TestResult {
    let store = CartStore::new(USD);

    store.add_item(&vase())?;
    store.add_item(&mug())?;
    store.update_quantity(&vase().id, 3);

    assert_eq!(
        quantities(&store),
        [("1".to_string(), 3), ("5".to_string(), 1)]
    );
    assert_eq!(store.item_count(), 4);
    assert_eq!(store.subtotal()?, Money::from_minor(29_900, USD));

    let summary = store.summary(&ShippingPolicy::standard(USD))?;

    assert!(summary.free_shipping());
    assert_eq!(summary.total(), Money::from_minor(29_900, USD));

    Ok(())
}

#[test]
fn observers_follow_the_scenario() -> TestResult {
    let store = CartStore::new(USD);
    let counts = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&counts);
    store.subscribe(move |event: &CartEvent| {
        sink.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.item_count());
    });

    store.add_item(&vase())?;
    store.add_item(&mug())?;
    store.update_quantity(&vase().id, 3);
    store.remove_item(&mug().id);

    let counts = counts.lock().unwrap_or_else(PoisonError::into_inner).clone();

    assert_eq!(counts, [1, 2, 4, 3]);

    Ok(())
}
