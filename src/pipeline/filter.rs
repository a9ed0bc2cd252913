use std::collections::HashSet;

use crate::catalog::Product;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchField {
    Title,
    Category,
    Brand,
    Description,
}

impl SearchField {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "title" => Some(Self::Title),
            "category" => Some(Self::Category),
            "brand" => Some(Self::Brand),
            "description" | "desc" => Some(Self::Description),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Category => "category",
            Self::Brand => "brand",
            Self::Description => "description",
        }
    }

    fn value<'a>(&self, product: &'a Product) -> Option<&'a str> {
        match self {
            Self::Title => Some(product.title.as_str()),
            Self::Category => product.category.as_deref(),
            Self::Brand => product.brand.as_deref(),
            Self::Description => product.description.as_deref(),
        }
    }
}

/// Fields consulted by the search term, in the order they are checked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchFields(Vec<SearchField>);

impl Default for SearchFields {
    fn default() -> Self {
        Self(vec![SearchField::Title, SearchField::Category])
    }
}

impl SearchFields {
    pub fn new(fields: Vec<SearchField>) -> Self {
        Self(fields)
    }

    pub fn all() -> Self {
        Self(vec![
            SearchField::Title,
            SearchField::Category,
            SearchField::Brand,
            SearchField::Description,
        ])
    }

    pub fn parse_csv(value: &str) -> Result<Self, String> {
        let raw = value.trim();
        if raw.is_empty() {
            return Err("search field list is empty".to_string());
        }
        let mut out: Vec<SearchField> = Vec::new();
        let mut seen: HashSet<SearchField> = HashSet::new();
        for part in raw.split(',') {
            let item = part.trim();
            if item.is_empty() {
                continue;
            }
            let field =
                SearchField::parse(item).ok_or_else(|| format!("unknown search field '{item}'"))?;
            if seen.insert(field) {
                out.push(field);
            }
        }
        if out.is_empty() {
            return Err("search field list is empty".to_string());
        }
        Ok(Self(out))
    }

    pub fn fields(&self) -> &[SearchField] {
        &self.0
    }

    pub fn label(&self) -> String {
        self.0
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    fn matches(&self, product: &Product, needle: &str) -> bool {
        self.0.iter().any(|field| {
            field
                .value(product)
                .map(|v| v.to_lowercase().contains(needle))
                .unwrap_or(false)
        })
    }
}

/// Keeps the products whose enabled fields contain `term`, ignoring case.
/// An empty term keeps everything in the original order.
pub fn filter_products<'a, I>(products: I, term: &str, fields: &SearchFields) -> Vec<&'a Product>
where
    I: IntoIterator<Item = &'a Product>,
{
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return products.into_iter().collect();
    }
    products
        .into_iter()
        .filter(|p| fields.matches(p, &needle))
        .collect()
}
