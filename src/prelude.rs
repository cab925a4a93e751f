//! Artisan prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    access::{AdminAccess, AuthState, NavLink, RoleProvider, StaticRoleProvider, User},
    cart::{
        Cart, CartChange, CartError, CartEvent, CartLineItem, CartObserver, CartStore,
        Subscription,
    },
    catalog::{Catalog, CatalogError, ProductFilter, ProductSource},
    fixtures::{FixtureError, load_catalog, parse_catalog},
    pricing::PricingError,
    products::{Product, ProductId},
    storefront::{Storefront, StorefrontError},
    summary::{OrderSummary, ShippingPolicy, SummaryError},
};
