//! The bundled catalog served when no external catalog is configured.

use common::{BookId, Money};

use super::Book;

struct Entry {
    id: i64,
    title: &'static str,
    author: &'static str,
    description: &'static str,
    price_cents: i64,
    stock: u32,
    category: &'static str,
    image: &'static str,
}

const ENTRIES: &[Entry] = &[
    Entry {
        id: 1,
        title: "The Great Gatsby",
        author: "F. Scott Fitzgerald",
        description: "A portrait of the jazz age, ambition and lost love on Long Island.",
        price_cents: 1599,
        stock: 25,
        category: "1",
        image: "/images/gatsby.jpg",
    },
    Entry {
        id: 2,
        title: "The Great Adventure",
        author: "John Doe",
        description: "A young hero crosses magical lands to save his kingdom.",
        price_cents: 1899,
        stock: 30,
        category: "2",
        image: "/images/adventure.jpg",
    },
    Entry {
        id: 3,
        title: "The Little Prince",
        author: "Antoine de Saint-Exupéry",
        description: "A child from another planet asks what matters most.",
        price_cents: 1299,
        stock: 40,
        category: "3",
        image: "/images/principito.jpg",
    },
    Entry {
        id: 4,
        title: "The Innovator's Dilemma",
        author: "Clayton M. Christensen",
        description: "Why disruptive technologies topple market leaders.",
        price_cents: 2299,
        stock: 15,
        category: "4",
        image: "/images/innovadores.jpg",
    },
    Entry {
        id: 5,
        title: "The Fourth Industrial Revolution",
        author: "Klaus Schwab",
        description: "How AI, robotics and connected devices reshape society.",
        price_cents: 1999,
        stock: 20,
        category: "4",
        image: "/images/cuarta-revolucion.jpg",
    },
    Entry {
        id: 6,
        title: "Atomic Habits",
        author: "James Clear",
        description: "Small, consistent changes that compound into big results.",
        price_cents: 1699,
        stock: 35,
        category: "5",
        image: "/images/atomic-habits.jpg",
    },
    Entry {
        id: 7,
        title: "Sapiens",
        author: "Yuval Noah Harari",
        description: "A brief history of humankind from the Stone Age to today.",
        price_cents: 2499,
        stock: 28,
        category: "6",
        image: "/images/sapiens.jpg",
    },
    Entry {
        id: 8,
        title: "The Hustle",
        author: "Neil Patel",
        description: "Digital marketing and building a business from scratch.",
        price_cents: 2199,
        stock: 18,
        category: "7",
        image: "/images/hustle.jpg",
    },
    Entry {
        id: 9,
        title: "1984",
        author: "George Orwell",
        description: "A dystopia of total surveillance and controlled truth.",
        price_cents: 1850,
        stock: 32,
        category: "8",
        image: "/images/1984.jpg",
    },
    Entry {
        id: 10,
        title: "One Hundred Years of Solitude",
        author: "Gabriel García Márquez",
        description: "Seven generations of the Buendía family in Macondo.",
        price_cents: 2299,
        stock: 22,
        category: "1",
        image: "/images/cien-anos.jpg",
    },
    Entry {
        id: 11,
        title: "Think and Grow Rich",
        author: "Napoleon Hill",
        description: "Principles of success drawn from America's wealthiest people.",
        price_cents: 1799,
        stock: 26,
        category: "5",
        image: "/images/think-grow-rich.jpg",
    },
    Entry {
        id: 12,
        title: "Clean Code",
        author: "Robert C. Martin",
        description: "Writing code that stays readable and maintainable.",
        price_cents: 2999,
        stock: 12,
        category: "4",
        image: "/images/clean-code.jpg",
    },
    Entry {
        id: 13,
        title: "The Power of Now",
        author: "Eckhart Tolle",
        description: "A guide to living in the present moment.",
        price_cents: 1650,
        stock: 24,
        category: "9",
        image: "/images/power-now.jpg",
    },
    Entry {
        id: 14,
        title: "Harry Potter and the Philosopher's Stone",
        author: "J.K. Rowling",
        description: "A boy discovers he is a wizard and finds his destiny.",
        price_cents: 1999,
        stock: 45,
        category: "2",
        image: "/images/harry-potter.jpg",
    },
    Entry {
        id: 15,
        title: "The Da Vinci Code",
        author: "Dan Brown",
        description: "A chase through art and history after a centuries-old secret.",
        price_cents: 2099,
        stock: 19,
        category: "10",
        image: "/images/da-vinci.jpg",
    },
];

/// Builds the bundled list of books.
pub fn bundled_books() -> Vec<Book> {
    ENTRIES
        .iter()
        .map(|e| Book {
            id: BookId::new(e.id),
            title: e.title.to_string(),
            author: e.author.to_string(),
            price: Money::from_cents(e.price_cents),
            image_url: e.image.to_string(),
            category: e.category.to_string(),
            description: Some(e.description.to_string()),
            stock: Some(e.stock),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn bundled_ids_are_unique() {
        let books = bundled_books();
        let ids: HashSet<_> = books.iter().map(|b| b.id).collect();
        assert_eq!(ids.len(), books.len());
        assert_eq!(books.len(), 15);
    }

    #[test]
    fn every_bundled_category_has_a_name() {
        assert!(bundled_books().iter().all(|b| b.category_name().is_some()));
    }
}
