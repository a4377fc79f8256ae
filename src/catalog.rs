use crate::models::Product;

/// Read-only product catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn find(&self, id: u64) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    /// Filters by category (`All` or `None` matches every product) and by a
    /// case-insensitive term over name, brand, and ingredients.
    pub fn search(&self, term: Option<&str>, category: Option<&str>) -> Vec<&Product> {
        let term = term.map(|t| t.trim().to_lowercase()).unwrap_or_default();
        let category = category.map(str::trim).filter(|c| !c.is_empty() && *c != "All");

        self.products
            .iter()
            .filter(|product| category.is_none_or(|c| product.category.eq_ignore_ascii_case(c)))
            .filter(|product| {
                term.is_empty()
                    || product.name.to_lowercase().contains(&term)
                    || product.brand.to_lowercase().contains(&term)
                    || product
                        .ingredients
                        .iter()
                        .any(|ingredient| ingredient.to_lowercase().contains(&term))
            })
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(default_products())
    }
}

fn product(
    id: u64,
    name: &str,
    brand: &str,
    price: f64,
    rating: f64,
    review_count: u32,
    category: &str,
    description: &str,
    ingredients: &[&str],
) -> Product {
    Product {
        id,
        name: name.to_string(),
        brand: brand.to_string(),
        price,
        rating,
        review_count,
        category: category.to_string(),
        image_url: format!("/static/products/{id}.jpg"),
        description: description.to_string(),
        ingredients: ingredients.iter().map(|i| i.to_string()).collect(),
    }
}

pub fn default_products() -> Vec<Product> {
    vec![
        product(
            1,
            "Gentle Foaming Cleanser",
            "Purely",
            18.0,
            4.6,
            1240,
            "Cleanser",
            "Low-pH foaming cleanser for daily use.",
            &["Glycerin", "Ceramide NP", "Panthenol"],
        ),
        product(
            2,
            "Vitamin C Brightening Serum",
            "Lumina",
            42.0,
            4.4,
            870,
            "Serum",
            "15% L-ascorbic acid serum for uneven tone.",
            &["Ascorbic Acid", "Ferulic Acid", "Vitamin E"],
        ),
        product(
            3,
            "Barrier Repair Moisturizer",
            "Dermacare",
            29.5,
            4.7,
            2013,
            "Moisturizer",
            "Rich cream that restores the skin barrier overnight.",
            &["Ceramide NP", "Cholesterol", "Squalane"],
        ),
        product(
            4,
            "Daily Mineral SPF 30",
            "SunSafe",
            24.0,
            4.3,
            655,
            "Sunscreen",
            "Lightweight zinc sunscreen with no white cast.",
            &["Zinc Oxide", "Niacinamide"],
        ),
        product(
            5,
            "Retinol Night Serum",
            "Lumina",
            48.0,
            4.5,
            932,
            "Serum",
            "Encapsulated 0.3% retinol for gradual renewal.",
            &["Retinol", "Bakuchiol", "Squalane"],
        ),
        product(
            6,
            "AHA Resurfacing Exfoliant",
            "Clarity Lab",
            32.0,
            4.2,
            418,
            "Exfoliant",
            "Glycolic and lactic acid blend for weekly resurfacing.",
            &["Glycolic Acid", "Lactic Acid", "Aloe Vera"],
        ),
        product(
            7,
            "Hyaluronic Hydrating Serum",
            "Dermacare",
            26.0,
            4.6,
            1502,
            "Serum",
            "Multi-weight hyaluronic acid for lasting hydration.",
            &["Hyaluronic Acid", "Panthenol"],
        ),
        product(
            8,
            "Oil Cleansing Balm",
            "Purely",
            22.0,
            4.4,
            389,
            "Cleanser",
            "Melts away sunscreen and makeup without stripping.",
            &["Caprylic Triglyceride", "Sunflower Seed Oil"],
        ),
    ]
}
