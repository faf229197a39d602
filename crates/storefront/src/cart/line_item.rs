use common::{BookId, Money};
use purchase_store::PurchaseRecordItem;
use serde::{Deserialize, Serialize};

use crate::catalog::Book;

/// Anything that can be put into the cart.
pub trait Purchasable {
    fn book_id(&self) -> BookId;
    fn title(&self) -> &str;
    fn price(&self) -> Money;
    fn image_url(&self) -> &str;
}

impl Purchasable for Book {
    fn book_id(&self) -> BookId {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn price(&self) -> Money {
        self.price
    }

    fn image_url(&self) -> &str {
        &self.image_url
    }
}

/// One book-quantity pair in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub id: BookId,
    pub title: String,
    pub price: Money,
    #[serde(default)]
    pub image_url: String,
    /// Entries persisted without a quantity count as one copy.
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

impl CartLineItem {
    /// Creates a line item for `quantity` copies of a product.
    pub fn new<P: Purchasable + ?Sized>(product: &P, quantity: u32) -> Self {
        Self {
            id: product.book_id(),
            title: product.title().to_string(),
            price: product.price(),
            image_url: product.image_url().to_string(),
            quantity,
        }
    }

    /// Price multiplied by quantity, or `None` if it does not fit.
    pub fn line_total(&self) -> Option<Money> {
        self.price.checked_multiply(self.quantity)
    }

    /// Freezes this line into the immutable form stored with a purchase.
    pub fn snapshot(&self) -> PurchaseRecordItem {
        PurchaseRecordItem::new(
            self.id,
            self.title.clone(),
            self.price,
            self.image_url.clone(),
            self.quantity,
        )
    }
}

impl Purchasable for CartLineItem {
    fn book_id(&self) -> BookId {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn price(&self) -> Money {
        self.price
    }

    fn image_url(&self) -> &str {
        &self.image_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gatsby() -> Book {
        Book {
            id: BookId::new(1),
            title: "The Great Gatsby".to_string(),
            author: "F. Scott Fitzgerald".to_string(),
            price: Money::from_cents(1599),
            image_url: "/images/gatsby.jpg".to_string(),
            category: "1".to_string(),
            description: None,
            stock: Some(25),
        }
    }

    #[test]
    fn line_item_copies_book_fields() {
        let line = CartLineItem::new(&gatsby(), 2);

        assert_eq!(line.id, BookId::new(1));
        assert_eq!(line.title, "The Great Gatsby");
        assert_eq!(line.line_total(), Some(Money::from_cents(3198)));
    }

    #[test]
    fn missing_quantity_defaults_to_one() {
        let json = r#"{"id": 1, "title": "The Great Gatsby", "price": 15.99, "imageUrl": "/g.jpg"}"#;

        let line: CartLineItem = serde_json::from_str(json).unwrap();

        assert_eq!(line.quantity, 1);
    }

    #[test]
    fn snapshot_is_detached_from_the_line() {
        let mut line = CartLineItem::new(&gatsby(), 2);
        let snapshot = line.snapshot();

        line.price = Money::from_cents(999);
        line.title = "Renamed".to_string();

        assert_eq!(snapshot.price, Money::from_cents(1599));
        assert_eq!(snapshot.title, "The Great Gatsby");
        assert_eq!(snapshot.quantity, 2);
    }
}
