use common::{BookId, Money};

use super::{CartError, CartLineItem, CartStorage, Purchasable};

/// Well-known storage key the cart lives under.
pub const CART_KEY: &str = "cart";

/// The shopping cart.
///
/// Every operation is a read-modify-write of the full line-item list against
/// the storage: nothing is cached between calls, so a reload always sees the
/// last persisted state. Line items are unique by book id and keep insertion
/// order.
#[derive(Debug, Clone)]
pub struct CartStore<S: CartStorage> {
    storage: S,
    key: String,
}

impl<S: CartStorage> CartStore<S> {
    /// Creates a cart persisted under [`CART_KEY`].
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, CART_KEY)
    }

    /// Creates a cart persisted under a custom key.
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn read(&self) -> Result<Vec<CartLineItem>, CartError> {
        let Some(raw) = self.storage.load(&self.key)? else {
            return Ok(Vec::new());
        };
        let mut items: Vec<CartLineItem> =
            serde_json::from_str(&raw).map_err(CartError::Corrupted)?;
        for item in &mut items {
            if item.quantity == 0 {
                item.quantity = 1;
            }
        }
        Ok(items)
    }

    fn write(&self, items: &[CartLineItem]) -> Result<(), CartError> {
        let raw = serde_json::to_string(items)?;
        self.storage.save(&self.key, &raw)
    }

    /// Adds `quantity` copies of a product.
    ///
    /// If the product is already in the cart its quantity is increased,
    /// otherwise a new line item is appended. Returns the resulting line.
    #[tracing::instrument(skip(self, product), fields(book_id = %product.book_id()))]
    pub fn add<P: Purchasable + ?Sized>(
        &mut self,
        product: &P,
        quantity: u32,
    ) -> Result<CartLineItem, CartError> {
        let book_id = product.book_id();
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { book_id, quantity });
        }

        let mut items = self.read()?;
        let line = match items.iter().position(|i| i.id == book_id) {
            Some(pos) => {
                let mut line = items[pos].clone();
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CartError::InvalidQuantity { book_id, quantity })?;
                check_line_total(&line)?;
                items[pos] = line.clone();
                line
            }
            None => {
                let line = CartLineItem::new(product, quantity);
                check_line_total(&line)?;
                items.push(line.clone());
                line
            }
        };

        self.write(&items)?;
        tracing::debug!(quantity = line.quantity, "cart line updated");
        Ok(line)
    }

    /// Adds a single copy of a product.
    pub fn add_one<P: Purchasable + ?Sized>(
        &mut self,
        product: &P,
    ) -> Result<CartLineItem, CartError> {
        self.add(product, 1)
    }

    /// Deletes the line item for `id` entirely, whatever its quantity.
    ///
    /// Returns the removed line, or `None` if the book was not in the cart.
    #[tracing::instrument(skip(self))]
    pub fn remove(&mut self, id: BookId) -> Result<Option<CartLineItem>, CartError> {
        let mut items = self.read()?;
        let Some(pos) = items.iter().position(|i| i.id == id) else {
            return Ok(None);
        };
        let removed = items.remove(pos);
        self.write(&items)?;
        Ok(Some(removed))
    }

    /// Takes one copy of `id` out of the cart, deleting the line when it
    /// would reach zero.
    ///
    /// Returns the remaining line, or `None` if the line is gone.
    #[tracing::instrument(skip(self))]
    pub fn decrement(&mut self, id: BookId) -> Result<Option<CartLineItem>, CartError> {
        let mut items = self.read()?;
        let Some(pos) = items.iter().position(|i| i.id == id) else {
            return Ok(None);
        };

        let remaining = if items[pos].quantity > 1 {
            items[pos].quantity -= 1;
            Some(items[pos].clone())
        } else {
            items.remove(pos);
            None
        };

        self.write(&items)?;
        Ok(remaining)
    }

    /// Returns the current line items in insertion order.
    pub fn get_all(&self) -> Result<Vec<CartLineItem>, CartError> {
        self.read()
    }

    /// Empties the cart.
    ///
    /// This also discards a corrupted persisted value.
    #[tracing::instrument(skip(self))]
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.storage.remove(&self.key)
    }

    /// Sum of `price * quantity` over all lines.
    pub fn total(&self) -> Result<Money, CartError> {
        self.read()?
            .iter()
            .try_fold(Money::zero(), |acc, line| {
                acc.checked_add(check_line_total(line)?)
                    .ok_or(CartError::TotalOutOfRange)
            })
    }

    /// Total number of copies in the cart.
    pub fn item_count(&self) -> Result<u64, CartError> {
        Ok(self.read()?.iter().map(|i| u64::from(i.quantity)).sum())
    }

    pub fn is_empty(&self) -> Result<bool, CartError> {
        Ok(self.read()?.is_empty())
    }
}

fn check_line_total(line: &CartLineItem) -> Result<Money, CartError> {
    line.line_total()
        .ok_or(CartError::LineTotalOutOfRange { book_id: line.id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::MemoryCartStorage;
    use crate::catalog::Book;

    fn book(id: i64, price_cents: i64) -> Book {
        Book {
            id: BookId::new(id),
            title: format!("Book {id}"),
            author: "Author".to_string(),
            price: Money::from_cents(price_cents),
            image_url: format!("/images/{id}.jpg"),
            category: "1".to_string(),
            description: None,
            stock: None,
        }
    }

    fn cart() -> CartStore<MemoryCartStorage> {
        CartStore::new(MemoryCartStorage::new())
    }

    #[test]
    fn adding_same_product_merges_quantities() {
        let mut cart = cart();
        let b = book(1, 1000);

        cart.add(&b, 1).unwrap();
        let line = cart.add(&b, 2).unwrap();

        let items = cart.get_all().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(line.quantity, 3);
    }

    #[test]
    fn add_rejects_zero_quantity() {
        let mut cart = cart();

        let err = cart.add(&book(1, 1000), 0).unwrap_err();

        assert!(matches!(err, CartError::InvalidQuantity { quantity: 0, .. }));
        assert!(cart.is_empty().unwrap());
    }

    #[test]
    fn add_keeps_insertion_order() {
        let mut cart = cart();
        cart.add_one(&book(3, 100)).unwrap();
        cart.add_one(&book(1, 100)).unwrap();
        cart.add_one(&book(2, 100)).unwrap();
        cart.add_one(&book(3, 100)).unwrap();

        let ids: Vec<_> = cart.get_all().unwrap().iter().map(|i| i.id.as_i64()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn remove_deletes_line_regardless_of_quantity() {
        let mut cart = cart();
        cart.add(&book(1, 1000), 5).unwrap();
        cart.add(&book(2, 500), 1).unwrap();

        let removed = cart.remove(BookId::new(1)).unwrap().unwrap();

        assert_eq!(removed.quantity, 5);
        let items = cart.get_all().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, BookId::new(2));
    }

    #[test]
    fn remove_missing_line_is_noop() {
        let mut cart = cart();
        cart.add_one(&book(1, 1000)).unwrap();

        assert!(cart.remove(BookId::new(9)).unwrap().is_none());
        assert_eq!(cart.get_all().unwrap().len(), 1);
    }

    #[test]
    fn decrement_drops_line_at_zero() {
        let mut cart = cart();
        cart.add(&book(1, 1000), 2).unwrap();

        let remaining = cart.decrement(BookId::new(1)).unwrap();
        assert_eq!(remaining.map(|l| l.quantity), Some(1));

        let remaining = cart.decrement(BookId::new(1)).unwrap();
        assert!(remaining.is_none());
        assert!(cart.is_empty().unwrap());
    }

    #[test]
    fn clear_empties_cart() {
        let mut cart = cart();
        cart.add_one(&book(1, 1000)).unwrap();
        cart.add_one(&book(2, 500)).unwrap();

        cart.clear().unwrap();

        assert!(cart.get_all().unwrap().is_empty());
    }

    #[test]
    fn total_sums_line_totals() {
        let mut cart = cart();
        cart.add(&book(1, 1000), 2).unwrap();
        cart.add(&book(2, 500), 1).unwrap();

        assert_eq!(cart.total().unwrap(), Money::from_cents(2500));
        assert_eq!(cart.item_count().unwrap(), 3);
    }

    #[test]
    fn adding_past_representable_line_total_is_rejected() {
        let mut cart = cart();
        let expensive = book(1, i64::MAX / 2);
        cart.add(&expensive, 2).unwrap();

        let err = cart.add(&expensive, 1).unwrap_err();

        assert!(matches!(err, CartError::LineTotalOutOfRange { book_id } if book_id == BookId::new(1)));
        assert_eq!(cart.get_all().unwrap()[0].quantity, 2);
    }

    #[test]
    fn total_reports_overflow_across_lines() {
        let mut cart = cart();
        cart.add(&book(1, i64::MAX / 2), 2).unwrap();
        cart.add(&book(2, 100), 1).unwrap();

        assert!(matches!(cart.total(), Err(CartError::TotalOutOfRange)));
    }

    #[test]
    fn cart_survives_reload_from_storage() {
        let storage = MemoryCartStorage::new();
        let mut first = CartStore::new(storage.clone());
        first.add(&book(1, 1000), 2).unwrap();

        let reloaded = CartStore::new(storage);

        assert_eq!(reloaded.get_all().unwrap(), first.get_all().unwrap());
    }

    #[test]
    fn corrupted_storage_is_reported_and_clearable() {
        let storage = MemoryCartStorage::new();
        storage.save(CART_KEY, "{not json").unwrap();
        let mut cart = CartStore::new(storage);

        assert!(matches!(cart.get_all(), Err(CartError::Corrupted(_))));

        cart.clear().unwrap();
        assert!(cart.get_all().unwrap().is_empty());
    }

    #[test]
    fn zero_quantity_entries_load_as_one() {
        let storage = MemoryCartStorage::new();
        storage
            .save(
                CART_KEY,
                r#"[{"id":1,"title":"Book 1","price":10.0,"imageUrl":"","quantity":0}]"#,
            )
            .unwrap();
        let cart = CartStore::new(storage);

        assert_eq!(cart.get_all().unwrap()[0].quantity, 1);
    }

    #[test]
    fn incrementing_from_a_line_item_reuses_its_identity() {
        let mut cart = cart();
        let line = cart.add_one(&book(4, 2299)).unwrap();

        cart.add_one(&line).unwrap();

        let items = cart.get_all().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
    }
}
