//! Demo catalog.

use techmart_core::{Category, Price, ProductId};

use crate::catalog::NewProduct;

struct Demo {
    name: &'static str,
    cents: u32,
    category: Category,
    description: &'static str,
    stock: u32,
    rating: f32,
    reviews: u32,
    specs: [&'static str; 4],
}

const DEMO: [Demo; 8] = [
    Demo {
        name: "MacBook Pro 14\"",
        cents: 199_999,
        category: Category::Electronics,
        description: "Apple M2 Pro chip, 16GB RAM, 512GB SSD. Perfect for developers and creative professionals.",
        stock: 15,
        rating: 4.8,
        reviews: 245,
        specs: ["M2 Pro Chip", "16GB RAM", "512GB SSD", "14\" Display"],
    },
    Demo {
        name: "iPhone 15 Pro",
        cents: 99_999,
        category: Category::Electronics,
        description: "A17 Pro chip, 128GB storage, Titanium design with advanced camera system.",
        stock: 30,
        rating: 4.7,
        reviews: 189,
        specs: ["A17 Pro Chip", "128GB Storage", "Titanium Build", "Pro Camera"],
    },
    Demo {
        name: "Nike Air Max 270",
        cents: 12_999,
        category: Category::Footwear,
        description: "Comfortable running shoes with Air Max technology and modern design.",
        stock: 50,
        rating: 4.5,
        reviews: 334,
        specs: ["Air Max Technology", "Mesh Upper", "Foam Midsole", "Rubber Outsole"],
    },
    Demo {
        name: "Sony WH-1000XM5",
        cents: 39_999,
        category: Category::Electronics,
        description: "Industry-leading wireless noise-canceling headphones with 30-hour battery life.",
        stock: 25,
        rating: 4.9,
        reviews: 156,
        specs: ["Noise Canceling", "30hr Battery", "Quick Charge", "Touch Controls"],
    },
    Demo {
        name: "Levi's 511 Slim Jeans",
        cents: 6_999,
        category: Category::Clothing,
        description: "Classic slim-fit denim jeans made from premium cotton blend.",
        stock: 40,
        rating: 4.3,
        reviews: 278,
        specs: ["Slim Fit", "98% Cotton", "Machine Wash", "Multiple Sizes"],
    },
    Demo {
        name: "Canon EOS R6 Mark II",
        cents: 249_999,
        category: Category::Electronics,
        description: "Full-frame mirrorless camera with 4K video recording and advanced autofocus.",
        stock: 8,
        rating: 4.6,
        reviews: 92,
        specs: ["Full Frame", "4K Video", "Image Stabilization", "Dual Card Slots"],
    },
    Demo {
        name: "Samsung 4K Smart TV 55\"",
        cents: 79_999,
        category: Category::Electronics,
        description: "55-inch 4K UHD Smart TV with HDR and built-in streaming apps.",
        stock: 12,
        rating: 4.4,
        reviews: 167,
        specs: ["4K UHD", "Smart TV", "HDR Support", "55\" Display"],
    },
    Demo {
        name: "Adidas Ultraboost 22",
        cents: 18_999,
        category: Category::Footwear,
        description: "Premium running shoes with Boost midsole technology and Primeknit upper.",
        stock: 35,
        rating: 4.6,
        reviews: 203,
        specs: ["Boost Technology", "Primeknit Upper", "Continental Rubber", "Energy Return"],
    },
];

/// The eight demo products, with ids `P001` through `P008`.
#[must_use]
pub fn demo_products() -> Vec<NewProduct> {
    (1..)
        .zip(DEMO.iter())
        .map(|(seq, demo)| NewProduct {
            id: Some(ProductId::from_sequence(seq)),
            name: demo.name.to_owned(),
            description: demo.description.to_owned(),
            price: Price::from_cents(demo.cents),
            category: demo.category,
            stock: demo.stock,
            rating: demo.rating,
            reviews_count: demo.reviews,
            specs: demo.specs.iter().map(|s| (*s).to_owned()).collect(),
        })
        .collect()
}
