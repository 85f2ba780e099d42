//! Product collection rules: id assignment, validation, stock edits and
//! category filtering. Pure data manipulation; the shop service decides when
//! a modified catalog is persisted and published.

mod images;

pub use images::{FsImageStore, ImageStore};

use std::path::Path;

use crate::domain::{Category, Product, ProductDraft};
use crate::error::{StoreError, StoreResult};

const MIN_RATING: f32 = 1.0;
const MAX_RATING: f32 = 5.0;
const DEFAULT_RATING: f32 = 4.0;
/// Largest accepted unit price, in rupiah.
pub const MAX_PRICE: u64 = 1_000_000_000_000;

#[derive(Debug, Clone, Default, PartialEq)]
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

    pub fn get(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == id)
    }

    /// All products, or those in `category`, in insertion order.
    pub fn list(&self, category: Option<Category>) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .cloned()
            .collect()
    }

    pub fn next_id(&self) -> u32 {
        self.products.iter().map(|p| p.id).max().map_or(1, |max| max + 1)
    }

    /// Validates `draft` and appends it with the next free id.
    pub fn create(&mut self, draft: ProductDraft, placeholder_image: &str) -> StoreResult<Product> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(StoreError::ValidationError("product name is required".to_string()));
        }
        let price = match draft.price {
            Some(price) if price > 0 && price as u64 <= MAX_PRICE => price as u64,
            Some(price) if price > 0 => {
                return Err(StoreError::ValidationError(format!(
                    "price must not exceed {}, got {}",
                    MAX_PRICE, price
                )))
            }
            Some(price) => {
                return Err(StoreError::ValidationError(format!("price must be positive, got {}", price)))
            }
            None => return Err(StoreError::ValidationError("price is required".to_string())),
        };
        let stock = match draft.stock {
            Some(stock) => checked_stock(stock)?,
            None => return Err(StoreError::ValidationError("stock is required".to_string())),
        };
        let rating = draft.rating.unwrap_or(DEFAULT_RATING);
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(StoreError::ValidationError(format!(
                "rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, rating
            )));
        }
        let image = draft
            .image
            .filter(|i| !i.trim().is_empty())
            .unwrap_or_else(|| placeholder_image.to_string());

        let product = Product {
            id: self.next_id(),
            name: name.to_string(),
            price,
            stock,
            description: draft.description,
            category: draft.category,
            rating,
            image,
        };
        self.products.push(product.clone());
        Ok(product)
    }

    pub fn update_stock(&mut self, id: u32, new_stock: i64) -> StoreResult<Product> {
        let stock = checked_stock(new_stock)?;
        let product = self.get_mut(id).ok_or_else(|| product_not_found(id))?;
        product.stock = stock;
        Ok(product.clone())
    }

    /// Points the product at a new image and returns the reference it replaced.
    pub fn replace_image(&mut self, id: u32, image: String) -> StoreResult<(Product, String)> {
        if image.trim().is_empty() {
            return Err(StoreError::ValidationError("image reference is required".to_string()));
        }
        let product = self.get_mut(id).ok_or_else(|| product_not_found(id))?;
        let previous = std::mem::replace(&mut product.image, image);
        Ok((product.clone(), previous))
    }

    pub fn remove(&mut self, id: u32) -> StoreResult<Product> {
        let index = self
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| product_not_found(id))?;
        Ok(self.products.remove(index))
    }
}

fn checked_stock(stock: i64) -> StoreResult<u32> {
    u32::try_from(stock)
        .map_err(|_| StoreError::ValidationError(format!("stock must be between 0 and {}, got {}", u32::MAX, stock)))
}

pub(crate) fn product_not_found(id: u32) -> StoreError {
    StoreError::NotFound(format!("product {}", id))
}

/// Products written on first start, when no products file exists yet.
pub fn sample_products(image_dir: &Path) -> Vec<Product> {
    vec![
        Product {
            id: 1,
            name: "Bawang Merah".to_string(),
            price: 15000,
            stock: 100,
            description: "Bawang merah segar kualitas premium".to_string(),
            category: Category::Bawang,
            rating: 4.5,
            image: image_dir.join("bawang_merah.jpg").display().to_string(),
        },
        Product {
            id: 2,
            name: "Bibit Bawang Merah".to_string(),
            price: 25000,
            stock: 50,
            description: "Bibit unggul siap tanam".to_string(),
            category: Category::Bibit,
            rating: 4.8,
            image: image_dir.join("bibit_bawang.jpg").display().to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLACEHOLDER: &str = "assets/logo.png";

    fn seeded() -> Catalog {
        Catalog::new(sample_products(Path::new("assets/products")))
    }

    #[test]
    fn list_filters_by_category_in_insertion_order() {
        let mut catalog = seeded();
        catalog
            .create(ProductDraft::new("Bawang Brebes", 18000, 40, Category::Bawang), PLACEHOLDER)
            .unwrap();

        let names: Vec<String> = catalog.list(Some(Category::Bawang)).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Bawang Merah", "Bawang Brebes"]);
        assert_eq!(catalog.list(None).len(), 3);
        assert!(Catalog::default().list(Some(Category::Bibit)).is_empty());
    }

    #[test]
    fn create_assigns_max_plus_one() {
        let mut catalog = Catalog::default();
        let first = catalog
            .create(ProductDraft::new("A", 1000, 1, Category::Bawang), PLACEHOLDER)
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.image, PLACEHOLDER);
        assert_eq!(first.rating, 4.0);

        let mut gappy = Catalog::new(vec![Product { id: 7, ..first.clone() }, Product { id: 3, ..first }]);
        let next = gappy
            .create(ProductDraft::new("B", 1000, 0, Category::Bibit), PLACEHOLDER)
            .unwrap();
        assert_eq!(next.id, 8);
        assert_eq!(next.stock, 0);
    }

    #[test]
    fn create_keeps_optional_fields() {
        let mut catalog = seeded();
        let draft = ProductDraft::new("Bibit Bima", 30000, 20, Category::Bibit)
            .with_description("Varietas Bima Brebes")
            .with_image("assets/products/bima.jpg")
            .with_rating(4.2);

        let created = catalog.create(draft, PLACEHOLDER).unwrap();

        assert_eq!(created.description, "Varietas Bima Brebes");
        assert_eq!(created.image, "assets/products/bima.jpg");
        assert_eq!(created.rating, 4.2);

        let blank_image = ProductDraft::new("Bibit Lokal", 20000, 5, Category::Bibit).with_image("  ");
        assert_eq!(catalog.create(blank_image, PLACEHOLDER).unwrap().image, PLACEHOLDER);
    }

    #[test]
    fn create_rejects_invalid_drafts() {
        let mut catalog = seeded();
        let blank = ProductDraft::new("   ", 1000, 1, Category::Bawang);
        let free = ProductDraft::new("Gratis", 0, 1, Category::Bawang);
        let negative = ProductDraft::new("Minus", 1000, -1, Category::Bawang);
        let no_stock = ProductDraft {
            stock: None,
            ..ProductDraft::new("Tanpa stok", 1000, 1, Category::Bawang)
        };
        let wild_rating = ProductDraft::new("Bintang", 1000, 1, Category::Bawang).with_rating(6.0);
        let priceless = ProductDraft::new("Mahal", i64::MAX, 10, Category::Bawang);

        for draft in [blank, free, negative, no_stock, wild_rating, priceless] {
            let err = catalog.create(draft, PLACEHOLDER).unwrap_err();
            assert!(err.is_validation(), "unexpected error {:?}", err);
        }
        assert_eq!(catalog, seeded());
    }

    #[test]
    fn update_stock_checks_id_and_sign() {
        let mut catalog = seeded();
        assert_eq!(catalog.update_stock(2, 7).unwrap().stock, 7);
        assert!(matches!(catalog.update_stock(99, 1), Err(StoreError::NotFound(_))));
        assert!(catalog.update_stock(1, -5).unwrap_err().is_validation());
        assert_eq!(catalog.get(1).unwrap().stock, 100);
    }

    #[test]
    fn remove_and_replace_image() {
        let mut catalog = seeded();
        let (updated, previous) = catalog.replace_image(1, "assets/products/new.jpg".into()).unwrap();
        assert_eq!(updated.image, "assets/products/new.jpg");
        assert!(previous.ends_with("bawang_merah.jpg"));

        let removed = catalog.remove(1).unwrap();
        assert_eq!(removed.id, 1);
        assert!(catalog.get(1).is_none());
        assert!(matches!(catalog.remove(1), Err(StoreError::NotFound(_))));
    }
}
