//! Fixtures for unit tests

use shared::{Item, ItemOption};

pub fn ramen() -> Item {
    Item {
        id: 1,
        name: "Ramen".into(),
        price: 780,
        image_url: None,
        category: Some("Noodles".into()),
        stock: 20,
        options: vec![
            ItemOption {
                id: 101,
                name: "Extra chashu".into(),
                price_adjustment: 100,
            },
            ItemOption {
                id: 102,
                name: "Seasoned egg".into(),
                price_adjustment: 50,
            },
        ],
    }
}

pub fn gyoza() -> Item {
    Item {
        id: 2,
        name: "Gyoza".into(),
        price: 450,
        image_url: None,
        category: Some("Sides".into()),
        stock: 5,
        options: vec![],
    }
}

pub fn sold_out_udon() -> Item {
    Item {
        id: 3,
        name: "Udon".into(),
        price: 650,
        image_url: None,
        category: Some("Noodles".into()),
        stock: 0,
        options: vec![],
    }
}

pub fn menu() -> Vec<Item> {
    vec![ramen(), gyoza(), sold_out_udon()]
}
