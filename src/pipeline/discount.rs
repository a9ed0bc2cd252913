use crate::catalog::Product;

/// Discount percentage for a product: the explicit `discount` when present,
/// otherwise inferred from `old_price`, otherwise 0.
pub fn derived_discount(product: &Product) -> i64 {
    if let Some(discount) = product.discount {
        return round_half_up(discount);
    }
    match product.old_price {
        Some(old) if old > 0.0 => round_half_up(100.0 - product.current_price / old * 100.0),
        _ => 0,
    }
}

// Halves round towards positive infinity, matching how deal prices are
// usually advertised (-12.5% shows as -13%, +2.5% as +3%).
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
