use std::cmp::Ordering;

use crate::catalog::Product;

use super::discount::derived_discount;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortMode {
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
    DiscountDesc,
    RatingDesc,
}

impl SortMode {
    pub const ALL: [SortMode; 5] = [
        SortMode::Default,
        SortMode::PriceAsc,
        SortMode::PriceDesc,
        SortMode::DiscountDesc,
        SortMode::RatingDesc,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "default" | "" => Some(Self::Default),
            "price-asc" => Some(Self::PriceAsc),
            "price-desc" => Some(Self::PriceDesc),
            "discount-desc" => Some(Self::DiscountDesc),
            "rating-desc" => Some(Self::RatingDesc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::DiscountDesc => "discount-desc",
            Self::RatingDesc => "rating-desc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Default => "Empfohlen",
            Self::PriceAsc => "Preis aufsteigend",
            Self::PriceDesc => "Preis absteigend",
            Self::DiscountDesc => "Höchster Rabatt",
            Self::RatingDesc => "Beste Bewertung",
        }
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|m| m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        let idx = Self::ALL.iter().position(|m| m == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Default => Ordering::Equal,
            Self::PriceAsc => a.current_price.total_cmp(&b.current_price),
            Self::PriceDesc => b.current_price.total_cmp(&a.current_price),
            Self::DiscountDesc => derived_discount(b).cmp(&derived_discount(a)),
            Self::RatingDesc => b
                .rating
                .unwrap_or(0.0)
                .total_cmp(&a.rating.unwrap_or(0.0)),
        }
    }
}

/// Stable in-place sort; equal keys keep their incoming relative order.
pub fn sort_products(products: &mut [&Product], mode: SortMode) {
    if mode == SortMode::Default {
        return;
    }
    products.sort_by(|a, b| mode.compare(a, b));
}
