use serde::{Deserialize, Serialize};

/// Suffix the upstream quote source sometimes leaves on author names.
const KINDLE_ARTIFACT: &str = ", type.kindle";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FavoriteItem {
    pub id: u32,
    pub content: String,
    pub author: String,
}

impl FavoriteItem {
    pub fn new(id: u32, content: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            author: author.into(),
        }
    }

    /// Author with the known `", type.kindle"` artifact removed.
    pub fn display_author(&self) -> String {
        clean_author(&self.author)
    }
}

pub fn clean_author(author: &str) -> String {
    author.replace(KINDLE_ARTIFACT, "")
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FavoriteToggle {
    Added,
    Removed,
}

/// In-memory favorites for one session. Insertion order is kept and ids are unique.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Favorites {
    items: Vec<FavoriteItem>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    pub fn remove(&mut self, id: u32) -> Option<FavoriteItem> {
        let idx = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(idx))
    }

    pub fn toggle(&mut self, item: FavoriteItem) -> FavoriteToggle {
        if self.remove(item.id).is_some() {
            FavoriteToggle::Removed
        } else {
            self.items.push(item);
            FavoriteToggle::Added
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FavoriteItem> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[FavoriteItem] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_kindle_artifact_from_author() {
        let item = FavoriteItem::new(
            1,
            "The secret of getting ahead is getting started.",
            "Mark Twain, type.kindle",
        );
        assert_eq!(item.display_author(), "Mark Twain");
        assert_eq!(clean_author("Seneca"), "Seneca");
    }

    #[test]
    fn toggle_adds_then_removes_by_id() {
        let mut favorites = Favorites::new();
        let item = FavoriteItem::new(7, "Stay hungry.", "Steve Jobs");

        assert_eq!(favorites.toggle(item.clone()), FavoriteToggle::Added);
        assert!(favorites.contains(7));
        assert_eq!(favorites.len(), 1);

        assert_eq!(favorites.toggle(item), FavoriteToggle::Removed);
        assert!(favorites.is_empty());
    }

    #[test]
    fn toggle_keeps_insertion_order() {
        let mut favorites = Favorites::new();
        favorites.toggle(FavoriteItem::new(3, "a", "x"));
        favorites.toggle(FavoriteItem::new(1, "b", "y"));
        favorites.toggle(FavoriteItem::new(8, "c", "z"));
        assert_eq!(favorites.toggle(FavoriteItem::new(1, "b", "y")), FavoriteToggle::Removed);

        let ids: Vec<u32> = favorites.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![3, 8]);
        assert_eq!(favorites.as_slice()[0].content, "a");
        assert_eq!(favorites.remove(9), None);
    }
}
