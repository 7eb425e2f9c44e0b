//! Order Pricing
//!
//! Fixed price table; all amounts are integer points. Totals are a pure
//! function of cup size, topping count, and the free-drink flag, so any
//! stored total can be recomputed and checked.

use crate::db::models::{CupSize, Pricing};

/// Base price of every drink
pub const BASE_PRICE: i64 = 60;

/// Flat price per topping
pub const TOPPING_PRICE: i64 = 10;

/// Fixed per-size surcharge
pub fn size_surcharge(cup_size: CupSize) -> i64 {
    match cup_size {
        CupSize::S => 0,
        CupSize::M => 10,
        CupSize::L => 20,
    }
}

/// Price an order. A free drink keeps its component prices for the
/// receipt but forces the total to zero.
pub fn price_order(cup_size: CupSize, topping_count: usize, is_free_drink: bool) -> Pricing {
    let size_surcharge = size_surcharge(cup_size);
    let toppings_total = topping_count as i64 * TOPPING_PRICE;
    let total = if is_free_drink {
        0
    } else {
        BASE_PRICE + size_surcharge + toppings_total
    };
    Pricing {
        base_price: BASE_PRICE,
        size_surcharge,
        toppings_total,
        total,
    }
}

/// Loyalty points earned from an order total (integer floor division).
/// A free order earns nothing.
pub fn points_earned(total: i64) -> i64 {
    total / 10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_table() {
        // S + 0 toppings → 60
        assert_eq!(price_order(CupSize::S, 0, false).total, 60);
        // M + 2 toppings → 60 + 10 + 20 = 90
        assert_eq!(price_order(CupSize::M, 2, false).total, 90);
        // L + 3 toppings → 60 + 20 + 30 = 110
        assert_eq!(price_order(CupSize::L, 3, false).total, 110);
    }

    #[test]
    fn test_free_drink_zeroes_total_only() {
        let pricing = price_order(CupSize::L, 0, true);
        assert_eq!(pricing.total, 0);
        // Components stay on the receipt
        assert_eq!(pricing.base_price, 60);
        assert_eq!(pricing.size_surcharge, 20);
        assert_eq!(pricing.toppings_total, 0);
    }

    #[test]
    fn test_total_recompute_round_trip() {
        for cup_size in [CupSize::S, CupSize::M, CupSize::L] {
            for topping_count in 0..5 {
                for is_free in [false, true] {
                    let stored = price_order(cup_size, topping_count, is_free);
                    let recomputed = price_order(cup_size, topping_count, is_free);
                    assert_eq!(stored, recomputed);
                    if !is_free {
                        assert_eq!(
                            stored.total,
                            stored.base_price + stored.size_surcharge + stored.toppings_total
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_points_floor_division() {
        assert_eq!(points_earned(0), 0); // free drink
        assert_eq!(points_earned(65), 6);
        assert_eq!(points_earned(90), 9);
        assert_eq!(points_earned(110), 11);
    }
}
