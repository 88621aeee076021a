//! Menu loaded once per authenticated session

use kiosk_client::{ClientResult, KioskApi};
use shared::{Item, ItemId};

#[derive(Debug, Clone, Default)]
pub struct Menu {
    items: Vec<Item>,
}

impl Menu {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// `GET /items`
    pub async fn load(api: &dyn KioskApi) -> ClientResult<Self> {
        let items = api.fetch_menu().await?;
        tracing::info!(items = items.len(), "Menu loaded");
        Ok(Self::new(items))
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for category in self.items.iter().filter_map(|i| i.category.as_deref()) {
            if !seen.contains(&category) {
                seen.push(category);
            }
        }
        seen
    }

    /// Items in `category`; `None` is the "all" tab
    pub fn by_category(&self, category: Option<&str>) -> Vec<&Item> {
        match category {
            None => self.items.iter().collect(),
            Some(c) => self
                .items
                .iter()
                .filter(|i| i.category.as_deref() == Some(c))
                .collect(),
        }
    }
}
