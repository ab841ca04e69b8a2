//! In-memory link store for single-process operation.
//!
//! Implements the same repository traits as the Postgres store, including
//! owner scoping, soft delete and per-link tag uniqueness. State is not
//! persisted across restarts.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use sixten_core::{
    Error, FavoriteTag, FavoriteTagRepository, Link, LinkFilter, LinkRepository, LinkStatus,
    NewLink, OwnerId, Result, Tag, TagRepository,
};

#[derive(Debug, Default)]
struct MemoryState {
    links: HashMap<Uuid, Link>,
    favorites: Vec<FavoriteTag>,
}

impl MemoryState {
    fn owned_mut(&mut self, owner: &OwnerId, id: Uuid) -> Result<&mut Link> {
        self.links
            .get_mut(&id)
            .filter(|l| l.user_id == owner.as_str())
            .ok_or(Error::LinkNotFound(id))
    }
}

fn duplicate_tag(name: &str) -> Error {
    Error::InvalidInput(format!("Tag '{}' is already on this link", name))
}

/// Lock-based store shared by clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn create(&self, owner: &OwnerId, new: NewLink) -> Result<Link> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        let mut tags: Vec<Tag> = Vec::with_capacity(new.tags.len());
        for draft in &new.tags {
            if tags
                .iter()
                .any(|t| t.tag_name.to_lowercase() == draft.name.to_lowercase())
            {
                return Err(duplicate_tag(&draft.name));
            }
            tags.push(Tag {
                id: Uuid::now_v7(),
                link_id: id,
                tag_name: draft.name.clone(),
                ai_suggested: draft.ai_suggested,
                created_at: now,
            });
        }

        let link = Link {
            id,
            user_id: owner.as_str().to_string(),
            url: new.url,
            title: new.title,
            summary: new.summary,
            content_type: new.content_type,
            estimated_minutes: new.estimated_minutes,
            status: LinkStatus::Inbox,
            note: None,
            image_data: new.image_data,
            manual_content: new.manual_content,
            created_at: now,
            updated_at: now,
            tags,
        };

        let mut state = self.state.write().await;
        state.links.insert(id, link.clone());
        Ok(link)
    }

    async fn get(&self, owner: &OwnerId, id: Uuid) -> Result<Option<Link>> {
        let state = self.state.read().await;
        Ok(state
            .links
            .get(&id)
            .filter(|l| l.user_id == owner.as_str())
            .cloned())
    }

    async fn list(&self, owner: &OwnerId, filter: &LinkFilter) -> Result<Vec<Link>> {
        let state = self.state.read().await;
        let mut links: Vec<Link> = state
            .links
            .values()
            .filter(|l| l.user_id == owner.as_str() && filter.matches(l))
            .cloned()
            .collect();
        // UUIDv7 ids break ties between equal timestamps in creation order.
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(links)
    }

    async fn update_status(
        &self,
        owner: &OwnerId,
        id: Uuid,
        status: LinkStatus,
        note: Option<&str>,
    ) -> Result<Link> {
        let mut state = self.state.write().await;
        let link = state.owned_mut(owner, id)?;
        link.status = status;
        if let Some(note) = note {
            link.note = Some(note.to_string());
        }
        link.updated_at = Utc::now();
        Ok(link.clone())
    }

    async fn soft_delete(&self, owner: &OwnerId, id: Uuid) -> Result<()> {
        let mut state = self.state.write().await;
        let link = state.owned_mut(owner, id)?;
        link.status = LinkStatus::Deleted;
        link.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn add(
        &self,
        owner: &OwnerId,
        link_id: Uuid,
        name: &str,
        ai_suggested: bool,
    ) -> Result<Tag> {
        let mut state = self.state.write().await;
        let link = state.owned_mut(owner, link_id)?;
        if link
            .tags
            .iter()
            .any(|t| t.tag_name.to_lowercase() == name.to_lowercase())
        {
            return Err(duplicate_tag(name));
        }
        let tag = Tag {
            id: Uuid::now_v7(),
            link_id,
            tag_name: name.to_string(),
            ai_suggested,
            created_at: Utc::now(),
        };
        link.tags.push(tag.clone());
        Ok(tag)
    }

    async fn remove(&self, owner: &OwnerId, link_id: Uuid, tag_id: Uuid) -> Result<()> {
        let mut state = self.state.write().await;
        let link = state.owned_mut(owner, link_id)?;
        let before = link.tags.len();
        link.tags.retain(|t| t.id != tag_id);
        if link.tags.len() == before {
            return Err(Error::NotFound(format!("Tag {} on link {}", tag_id, link_id)));
        }
        Ok(())
    }

    async fn replace(
        &self,
        owner: &OwnerId,
        link_id: Uuid,
        names: &[String],
        ai_suggested: bool,
    ) -> Result<Vec<Tag>> {
        let mut state = self.state.write().await;
        let link = state.owned_mut(owner, link_id)?;
        let now = Utc::now();

        let mut tags: Vec<Tag> = Vec::with_capacity(names.len());
        for name in names {
            if tags
                .iter()
                .any(|t| t.tag_name.to_lowercase() == name.to_lowercase())
            {
                return Err(duplicate_tag(name));
            }
            tags.push(Tag {
                id: Uuid::now_v7(),
                link_id,
                tag_name: name.clone(),
                ai_suggested,
                created_at: now,
            });
        }
        link.tags = tags.clone();
        Ok(tags)
    }

    async fn list_names(&self, owner: &OwnerId) -> Result<Vec<String>> {
        let state = self.state.read().await;
        let mut names: Vec<String> = state
            .links
            .values()
            .filter(|l| l.user_id == owner.as_str() && l.status != LinkStatus::Deleted)
            .flat_map(|l| l.tags.iter().map(|t| t.tag_name.clone()))
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}

#[async_trait]
impl FavoriteTagRepository for MemoryStore {
    async fn list(&self, owner: &OwnerId) -> Result<Vec<FavoriteTag>> {
        let state = self.state.read().await;
        let mut favorites: Vec<FavoriteTag> = state
            .favorites
            .iter()
            .filter(|f| f.user_id == owner.as_str())
            .cloned()
            .collect();
        favorites.sort_by(|a, b| a.tag_name.cmp(&b.tag_name));
        Ok(favorites)
    }

    async fn add(&self, owner: &OwnerId, name: &str) -> Result<FavoriteTag> {
        let mut state = self.state.write().await;
        if let Some(existing) = state
            .favorites
            .iter()
            .find(|f| f.user_id == owner.as_str() && f.tag_name == name)
        {
            return Ok(existing.clone());
        }
        let favorite = FavoriteTag {
            id: Uuid::now_v7(),
            user_id: owner.as_str().to_string(),
            tag_name: name.to_string(),
            created_at: Utc::now(),
        };
        state.favorites.push(favorite.clone());
        Ok(favorite)
    }

    async fn remove(&self, owner: &OwnerId, name: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.favorites.len();
        state
            .favorites
            .retain(|f| !(f.user_id == owner.as_str() && f.tag_name == name));
        Ok(state.favorites.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sixten_core::{ContentType, TagDraft};

    fn new_link(url: &str, tags: &[&str]) -> NewLink {
        NewLink {
            url: url.to_string(),
            title: "Title".into(),
            summary: "Summary".into(),
            content_type: ContentType::Article,
            estimated_minutes: 5,
            image_data: None,
            manual_content: None,
            tags: tags.iter().map(|t| TagDraft::suggested(*t)).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_starts_in_inbox_with_tags() {
        let store = MemoryStore::new();
        let owner = OwnerId::default();
        let link = LinkRepository::create(&store, &owner, new_link("https://a.se", &["rust", "web"]))
            .await
            .unwrap();

        assert_eq!(link.status, LinkStatus::Inbox);
        assert_eq!(link.tag_names(), vec!["rust", "web"]);
        assert!(link.tags.iter().all(|t| t.ai_suggested && t.link_id == link.id));

        let fetched = LinkRepository::get(&store, &owner, link.id).await.unwrap();
        assert_eq!(fetched, Some(link));
    }

    #[tokio::test]
    async fn test_owner_scoping() {
        let store = MemoryStore::new();
        let alice = OwnerId::new("alice");
        let bob = OwnerId::new("bob");
        let link = LinkRepository::create(&store, &alice, new_link("https://a.se", &[]))
            .await
            .unwrap();

        assert!(LinkRepository::get(&store, &bob, link.id).await.unwrap().is_none());
        assert!(LinkRepository::list(&store, &bob, &LinkFilter::default())
            .await
            .unwrap()
            .is_empty());
        let err = store
            .update_status(&bob, link.id, LinkStatus::Active, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LinkNotFound(_)));
    }

    #[tokio::test]
    async fn test_list_newest_first_and_hides_deleted() {
        let store = MemoryStore::new();
        let owner = OwnerId::default();
        let first = LinkRepository::create(&store, &owner, new_link("https://a.se/1", &[]))
            .await
            .unwrap();
        let second = LinkRepository::create(&store, &owner, new_link("https://a.se/2", &[]))
            .await
            .unwrap();

        let links = LinkRepository::list(&store, &owner, &LinkFilter::default())
            .await
            .unwrap();
        assert_eq!(links[0].id, second.id);
        assert_eq!(links[1].id, first.id);

        store.soft_delete(&owner, first.id).await.unwrap();
        let links = LinkRepository::list(&store, &owner, &LinkFilter::default())
            .await
            .unwrap();
        assert_eq!(links.len(), 1);

        let deleted = LinkRepository::list(&store, &owner, &LinkFilter::with_status(LinkStatus::Deleted))
            .await
            .unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].id, first.id);
    }

    #[tokio::test]
    async fn test_update_status_keeps_note_when_absent() {
        let store = MemoryStore::new();
        let owner = OwnerId::default();
        let link = LinkRepository::create(&store, &owner, new_link("https://a.se", &[]))
            .await
            .unwrap();

        let done = store
            .update_status(&owner, link.id, LinkStatus::Done, Some("great read"))
            .await
            .unwrap();
        assert_eq!(done.note.as_deref(), Some("great read"));

        let again = store
            .update_status(&owner, link.id, LinkStatus::Done, None)
            .await
            .unwrap();
        assert_eq!(again.note.as_deref(), Some("great read"));
    }

    #[tokio::test]
    async fn test_tag_add_remove_replace() {
        let store = MemoryStore::new();
        let owner = OwnerId::default();
        let link = LinkRepository::create(&store, &owner, new_link("https://a.se", &["rust"]))
            .await
            .unwrap();

        let tag = TagRepository::add(&store, &owner, link.id, "async", false)
            .await
            .unwrap();
        assert!(!tag.ai_suggested);

        let err = TagRepository::add(&store, &owner, link.id, "RUST", false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        TagRepository::remove(&store, &owner, link.id, tag.id)
            .await
            .unwrap();
        assert!(TagRepository::remove(&store, &owner, link.id, tag.id)
            .await
            .is_err());

        let replaced = store
            .replace(&owner, link.id, &["a".to_string(), "b".to_string()], false)
            .await
            .unwrap();
        assert_eq!(replaced.len(), 2);
        let fetched = LinkRepository::get(&store, &owner, link.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.tag_names(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_list_names_skips_deleted_links() {
        let store = MemoryStore::new();
        let owner = OwnerId::default();
        LinkRepository::create(&store, &owner, new_link("https://a.se/1", &["rust", "web"]))
            .await
            .unwrap();
        let gone = LinkRepository::create(&store, &owner, new_link("https://a.se/2", &["old"]))
            .await
            .unwrap();
        store.soft_delete(&owner, gone.id).await.unwrap();

        let names = store.list_names(&owner).await.unwrap();
        assert_eq!(names, vec!["rust", "web"]);
    }

    #[tokio::test]
    async fn test_favorites() {
        let store = MemoryStore::new();
        let owner = OwnerId::default();

        let first = FavoriteTagRepository::add(&store, &owner, "rust").await.unwrap();
        let again = FavoriteTagRepository::add(&store, &owner, "rust").await.unwrap();
        assert_eq!(first.id, again.id);
        FavoriteTagRepository::add(&store, &owner, "ai").await.unwrap();

        let names: Vec<String> = FavoriteTagRepository::list(&store, &owner)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.tag_name)
            .collect();
        assert_eq!(names, vec!["ai", "rust"]);

        assert!(FavoriteTagRepository::remove(&store, &owner, "ai").await.unwrap());
        assert!(!FavoriteTagRepository::remove(&store, &owner, "ai").await.unwrap());
    }
}
