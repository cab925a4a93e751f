//! Cart Store
//!
//! Shared, observable cart state. A [`CartStore`] is a cheap handle: clones
//! refer to the same cart. Mutations are serialized and every mutation is
//! followed by a synchronous notification of all subscribed observers, in
//! subscription order, before the mutating call returns.
//!
//! Observers run without any store lock held. They may read the store,
//! subscribe or unsubscribe. A mutation made from inside an observer is
//! applied straight away; its event is queued and delivered once the current
//! event has reached every observer.

use std::{
    collections::{BTreeMap, VecDeque},
    convert::Infallible,
    fmt,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, ThreadId},
};

use rusty_money::{Money, iso::Currency};
use tracing::{debug, trace};

use crate::{
    cart::{Cart, CartChange, CartError, CartLineItem},
    pricing::{self, PricingError},
    products::{Product, ProductId},
    summary::{OrderSummary, ShippingPolicy},
};

/// Receives cart change notifications.
///
/// Implemented for any `Fn(&CartEvent) + Send + Sync` closure.
pub trait CartObserver: Send + Sync {
    /// Called once per mutation, after the mutation is visible in the store.
    fn on_cart_changed(&self, event: &CartEvent);
}

impl<F> CartObserver for F
where
    F: Fn(&CartEvent) + Send + Sync,
{
    fn on_cart_changed(&self, event: &CartEvent) {
        self(event);
    }
}

/// Handle returned by [`CartStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Subscription(u64);

/// Notification sent to observers after a mutation.
#[derive(Debug, Clone)]
pub struct CartEvent {
    /// Store revision produced by this mutation
    pub revision: u64,

    /// What the mutation did
    pub change: CartChange,

    /// Line items right after the mutation
    pub items: Arc<[CartLineItem]>,

    /// Cart currency
    pub currency: &'static Currency,
}

impl CartEvent {
    /// Sum of quantities in the snapshot.
    pub fn item_count(&self) -> u64 {
        pricing::item_count(&self.items)
    }

    /// Subtotal of the snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the total overflows.
    pub fn subtotal(&self) -> Result<Money<'static, Currency>, PricingError> {
        pricing::subtotal(&self.items, self.currency)
    }
}

type SharedObserver = Arc<dyn CartObserver>;

struct State {
    cart: Cart,
    revision: u64,
}

struct Inner {
    state: RwLock<State>,
    observers: Mutex<BTreeMap<Subscription, SharedObserver>>,
    next_subscription: AtomicU64,
    gate: Mutex<()>,
    pending: Mutex<VecDeque<CartEvent>>,
    dispatching: Mutex<Option<ThreadId>>,
}

/// Cart Store
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = read(&self.inner.state);

        f.debug_struct("CartStore")
            .field("cart", &state.cart)
            .field("revision", &state.revision)
            .field("observers", &lock(&self.inner.observers).len())
            .finish()
    }
}

impl CartStore {
    /// Create a store holding an empty cart in the given currency.
    pub fn new(currency: &'static Currency) -> Self {
        Self::with_cart(Cart::new(currency))
    }

    /// Create a store around an existing cart.
    pub fn with_cart(cart: Cart) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(State { cart, revision: 0 }),
                observers: Mutex::new(BTreeMap::new()),
                next_subscription: AtomicU64::new(0),
                gate: Mutex::new(()),
                pending: Mutex::new(VecDeque::new()),
                dispatching: Mutex::new(None),
            }),
        }
    }

    /// Add one unit of a product and notify observers.
    ///
    /// Called from inside an observer, the change applies immediately but its
    /// event is delivered after the current event has reached every observer.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CurrencyMismatch`] if the product is priced in a
    /// different currency than the cart. Nothing changes and nobody is notified.
    pub fn add_item(&self, product: &Product) -> Result<CartChange, CartError> {
        self.mutate(|cart| cart.add(product))
    }

    /// Remove a line item and notify observers. Unknown ids are a no-op.
    ///
    /// Called from inside an observer, the change applies immediately but its
    /// event is delivered after the current event has reached every observer.
    pub fn remove_item(&self, product_id: &ProductId) -> CartChange {
        self.mutate_infallible(|cart| cart.remove(product_id))
    }

    /// Set a line item's quantity and notify observers.
    ///
    /// A quantity of zero or less removes the line item. Unknown ids are a no-op.
    ///
    /// Called from inside an observer, the change applies immediately but its
    /// event is delivered after the current event has reached every observer.
    pub fn update_quantity(&self, product_id: &ProductId, quantity: i64) -> CartChange {
        self.mutate_infallible(|cart| cart.set_quantity(product_id, quantity))
    }

    /// Sum of quantities across all line items.
    pub fn item_count(&self) -> u64 {
        read(&self.inner.state).cart.item_count()
    }

    /// Sum of price × quantity across all line items.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the total overflows.
    pub fn subtotal(&self) -> Result<Money<'static, Currency>, PricingError> {
        read(&self.inner.state).cart.subtotal()
    }

    /// Copy of the line items in insertion order.
    pub fn items(&self) -> Vec<CartLineItem> {
        read(&self.inner.state).cart.items().to_vec()
    }

    /// Copy of the whole cart.
    pub fn snapshot(&self) -> Cart {
        read(&self.inner.state).cart.clone()
    }

    /// Copy of a single line item.
    pub fn get(&self, product_id: &ProductId) -> Option<CartLineItem> {
        read(&self.inner.state).cart.get(product_id).cloned()
    }

    /// Number of distinct line items.
    pub fn len(&self) -> usize {
        read(&self.inner.state).cart.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        read(&self.inner.state).cart.is_empty()
    }

    /// Currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        read(&self.inner.state).cart.currency()
    }

    /// Number of mutations applied so far.
    pub fn revision(&self) -> u64 {
        read(&self.inner.state).revision
    }

    /// Subtotal, shipping and total for the current cart.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if any total overflows or the policy uses
    /// another currency.
    pub fn summary(&self, policy: &ShippingPolicy) -> Result<OrderSummary, PricingError> {
        let state = read(&self.inner.state);

        OrderSummary::from_items(state.cart.items(), state.cart.currency(), policy)
    }

    /// Register an observer. It receives every event produced after this call.
    pub fn subscribe(&self, observer: impl CartObserver + 'static) -> Subscription {
        let subscription = Subscription(
            self.inner
                .next_subscription
                .fetch_add(1, Ordering::Relaxed),
        );

        lock(&self.inner.observers).insert(subscription, Arc::new(observer));

        trace!(subscription = subscription.0, "cart observer subscribed");

        subscription
    }

    /// Remove an observer. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let removed = lock(&self.inner.observers).remove(&subscription).is_some();

        trace!(subscription = subscription.0, removed, "cart observer unsubscribed");

        removed
    }

    /// Number of subscribed observers.
    pub fn observer_count(&self) -> usize {
        lock(&self.inner.observers).len()
    }

    fn mutate_infallible(&self, apply: impl FnOnce(&mut Cart) -> CartChange) -> CartChange {
        match self.mutate(|cart| Ok::<_, Infallible>(apply(cart))) {
            Ok(change) => change,
            Err(never) => match never {},
        }
    }

    fn mutate<E>(
        &self,
        apply: impl FnOnce(&mut Cart) -> Result<CartChange, E>,
    ) -> Result<CartChange, E> {
        let current = thread::current().id();
        let nested = *lock(&self.inner.dispatching) == Some(current);

        if nested {
            // Called from an observer on this thread; the outer call delivers it.
            return self.apply(apply);
        }

        let _gate = lock(&self.inner.gate);
        let _dispatch = DispatchGuard::enter(&self.inner, current);

        let change = self.apply(apply)?;

        self.drain();

        Ok(change)
    }

    fn apply<E>(
        &self,
        apply: impl FnOnce(&mut Cart) -> Result<CartChange, E>,
    ) -> Result<CartChange, E> {
        let mut state = write(&self.inner.state);

        let change = apply(&mut state.cart)?;

        state.revision += 1;

        let event = CartEvent {
            revision: state.revision,
            change: change.clone(),
            items: Arc::from(state.cart.items()),
            currency: state.cart.currency(),
        };

        debug!(
            revision = event.revision,
            change = ?event.change,
            item_count = event.item_count(),
            "cart updated"
        );

        // Queued while the state lock is held, so queue order is mutation order.
        lock(&self.inner.pending).push_back(event);

        Ok(change)
    }

    fn drain(&self) {
        loop {
            let next = lock(&self.inner.pending).pop_front();

            let Some(event) = next else {
                break;
            };

            let observers: Vec<(Subscription, SharedObserver)> = lock(&self.inner.observers)
                .iter()
                .map(|(subscription, observer)| (*subscription, Arc::clone(observer)))
                .collect();

            for (subscription, observer) in observers {
                let subscribed = lock(&self.inner.observers).contains_key(&subscription);

                if subscribed {
                    observer.on_cart_changed(&event);
                }
            }
        }
    }
}

/// Marks the current thread as delivering events for a store.
///
/// Cleared on drop, including when an observer panics; undelivered events
/// are discarded at that point.
struct DispatchGuard<'a> {
    inner: &'a Inner,
}

impl<'a> DispatchGuard<'a> {
    fn enter(inner: &'a Inner, thread: ThreadId) -> Self {
        *lock(&inner.dispatching) = Some(thread);

        Self { inner }
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        lock(&self.inner.pending).clear();
        *lock(&self.inner.dispatching) = None;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
