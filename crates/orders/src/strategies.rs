//! Proptest strategies shared by the in-module property tests.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::order::{Amount, Customer, LineItem, Order, Payment, Refund, Shipping};

pub fn line() -> impl Strategy<Value = LineItem> {
    (
        prop::option::weighted(0.9, "[A-Z]{2,4}-[A-Z]{1,3}"),
        prop::option::weighted(0.95, -3i64..10),
        prop::option::weighted(0.95, (-2000i64..5000, 0u32..3)),
    )
        .prop_map(|(sku, qty, price)| LineItem {
            sku,
            qty: qty.map(|q| Amount::Exact(Decimal::from(q))),
            price: price.map(|(mantissa, scale)| Amount::Exact(Decimal::new(mantissa, scale))),
        })
}

pub fn order() -> impl Strategy<Value = Order> {
    (
        prop::option::weighted(0.9, "A-10[0-9]{2}"),
        prop::option::weighted(
            0.95,
            prop::sample::select(vec!["PAID", "PENDING", "CANCELLED", "SHIPPED", ""]),
        ),
        prop::option::of(prop::sample::select(vec![
            "ann@example.com",
            "bob.example.com",
            "c@d",
            "eve@mail.example.org",
        ])),
        prop::collection::vec(line(), 0..5),
        prop::option::of(any::<bool>()),
        prop::option::of(-100i64..500),
        prop::option::of(-10i64..20),
    )
        .prop_map(|(id, status, email, lines, captured, refund, fee)| Order {
            id,
            status: status.map(str::to_string),
            customer: Customer {
                email: email.map(str::to_string),
            },
            lines,
            payment: Payment { captured },
            refund: Refund {
                amount: refund.map(|r| Amount::Exact(Decimal::from(r))),
            },
            shipping: Shipping {
                fee: fee.map(|f| Amount::Exact(Decimal::from(f))),
            },
        })
}

pub fn orders() -> impl Strategy<Value = Vec<Order>> {
    prop::collection::vec(order(), 0..12)
}
