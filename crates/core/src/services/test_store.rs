//! In-memory [`EmoteStore`] for service tests.

use std::ops::Sub;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use emotes_common::{AppError, AppResult};
use emotes_db::entities::{emote, emote_name, tag};
use emotes_db::{EmotePatch, EmoteStore, NewEmote};
use sea_orm::{Set, TryIntoModel};

/// Write calls seen by the store.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Calls {
    pub create: usize,
    pub update: usize,
    pub attach_tag: usize,
    pub detach_tag: usize,
    pub attach_name: usize,
    pub delete_name: usize,
}

impl Calls {
    pub const fn writes(self) -> usize {
        self.create
            + self.update
            + self.attach_tag
            + self.detach_tag
            + self.attach_name
            + self.delete_name
    }
}

impl Sub for Calls {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            create: self.create - rhs.create,
            update: self.update - rhs.update,
            attach_tag: self.attach_tag - rhs.attach_tag,
            detach_tag: self.detach_tag - rhs.detach_tag,
            attach_name: self.attach_name - rhs.attach_name,
            delete_name: self.delete_name - rhs.delete_name,
        }
    }
}

#[derive(Default)]
struct State {
    emotes: Vec<emote::Model>,
    tags: Vec<tag::Model>,
    emote_tags: Vec<(i32, String)>,
    names: Vec<emote_name::Model>,
    failing_tags: Vec<String>,
    fail_create: bool,
    calls: Calls,
    next_id: i32,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn tag(&mut self, name: &str) -> tag::Model {
        if let Some(tag) = self.tags.iter().find(|t| t.name == name) {
            return tag.clone();
        }
        let tag = tag::Model {
            id: format!("tag{}", self.next_id()),
            name: name.to_string(),
            created_at: Utc::now().fixed_offset(),
        };
        self.tags.push(tag.clone());
        tag
    }

    fn name(&mut self, name: &str) -> emote_name::Model {
        if let Some(row) = self.names.iter().find(|n| n.name == name) {
            return row.clone();
        }
        let row = emote_name::Model {
            id: format!("name{}", self.next_id()),
            name: name.to_string(),
            emote_id: None,
            created_at: Utc::now().fixed_offset(),
        };
        self.names.push(row.clone());
        row
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn calls(&self) -> Calls {
        self.state.lock().unwrap().calls
    }

    /// Make every attach of the tag `name` fail.
    pub fn fail_tag(&self, name: &str) {
        self.state.lock().unwrap().failing_tags.push(name.to_string());
    }

    /// Make every insert fail as if the canonical name had been taken concurrently.
    pub fn fail_create(&self) {
        self.state.lock().unwrap().fail_create = true;
    }

    pub fn seed_emote(&self, canonical_name: &str) -> emote::Model {
        let mut state = self.state.lock().unwrap();
        let model = emote::Model {
            id: state.next_id(),
            canonical_name: canonical_name.to_string(),
            single_image_extension: "png".to_string(),
            img_animation: false,
            width: Some(70),
            height: Some(70),
            has_hover: false,
            single_hover_image_extension: None,
            hover_animation: false,
            hover_width: None,
            hover_height: None,
            src: None,
            alt_text: None,
            css: None,
            created_by: None,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        state.emotes.push(model.clone());
        model
    }

    pub fn seed_tags(&self, emote_id: i32, names: &[&str]) {
        let mut state = self.state.lock().unwrap();
        for name in names {
            let tag = state.tag(name);
            state.emote_tags.push((emote_id, tag.id));
        }
    }

    pub fn seed_names(&self, emote_id: i32, names: &[&str]) {
        let mut state = self.state.lock().unwrap();
        for name in names {
            let row = state.name(name);
            if let Some(stored) = state.names.iter_mut().find(|n| n.id == row.id) {
                stored.emote_id = Some(emote_id);
            }
        }
    }
}

#[async_trait]
impl EmoteStore for MemoryStore {
    async fn find_by_canonical_name(&self, name: &str) -> AppResult<Option<emote::Model>> {
        let state = self.state.lock().unwrap();
        Ok(state.emotes.iter().find(|e| e.canonical_name == name).cloned())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<emote::Model>> {
        let state = self.state.lock().unwrap();
        Ok(state.emotes.iter().find(|e| e.id == id).cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<emote::Model>> {
        Ok(self.state.lock().unwrap().emotes.clone())
    }

    async fn create(&self, new_emote: NewEmote) -> AppResult<emote::Model> {
        let mut state = self.state.lock().unwrap();
        state.calls.create += 1;
        if state.fail_create
            || state
                .emotes
                .iter()
                .any(|e| e.canonical_name == new_emote.canonical_name)
        {
            return Err(AppError::Conflict(new_emote.canonical_name));
        }

        let mut model = new_emote.into_active_model();
        model.id = Set(state.next_id());
        let model = model.try_into_model().unwrap();
        state.emotes.push(model.clone());
        Ok(model)
    }

    async fn update(&self, canonical_name: &str, patch: EmotePatch) -> AppResult<emote::Model> {
        let mut state = self.state.lock().unwrap();
        state.calls.update += 1;
        let stored = state
            .emotes
            .iter_mut()
            .find(|e| e.canonical_name == canonical_name)
            .ok_or_else(|| AppError::NotFound(canonical_name.to_string()))?;

        let mut model: emote::ActiveModel = stored.clone().into();
        patch.apply(&mut model);
        *stored = model.try_into_model().unwrap();
        Ok(stored.clone())
    }

    async fn list_tags(&self) -> AppResult<Vec<tag::Model>> {
        Ok(self.state.lock().unwrap().tags.clone())
    }

    async fn tags_of(&self, emote_id: i32) -> AppResult<Vec<tag::Model>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .tags
            .iter()
            .filter(|t| state.emote_tags.contains(&(emote_id, t.id.clone())))
            .cloned()
            .collect())
    }

    async fn find_or_create_tag(&self, name: &str) -> AppResult<tag::Model> {
        Ok(self.state.lock().unwrap().tag(name))
    }

    async fn attach_tag(&self, emote_id: i32, tag_id: &str) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.attach_tag += 1;
        let failing = state
            .tags
            .iter()
            .any(|t| t.id == tag_id && state.failing_tags.contains(&t.name));
        if failing {
            return Err(AppError::Database(format!("attach of {tag_id} failed")));
        }
        let link = (emote_id, tag_id.to_string());
        if !state.emote_tags.contains(&link) {
            state.emote_tags.push(link);
        }
        Ok(())
    }

    async fn detach_tag(&self, emote_id: i32, tag_id: &str) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.detach_tag += 1;
        state
            .emote_tags
            .retain(|(e, t)| !(*e == emote_id && t == tag_id));
        Ok(())
    }

    async fn names_of(&self, emote_id: i32) -> AppResult<Vec<emote_name::Model>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .names
            .iter()
            .filter(|n| n.emote_id == Some(emote_id))
            .cloned()
            .collect())
    }

    async fn find_or_create_name(&self, name: &str) -> AppResult<emote_name::Model> {
        Ok(self.state.lock().unwrap().name(name))
    }

    async fn attach_name(&self, emote_id: i32, name_id: &str) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.attach_name += 1;
        match state.names.iter_mut().find(|n| n.id == name_id) {
            Some(row) if row.emote_id.is_none() => {
                row.emote_id = Some(emote_id);
                Ok(())
            }
            Some(_) => Err(AppError::Conflict(format!("{name_id} is bound"))),
            None => Err(AppError::NotFound(name_id.to_string())),
        }
    }

    async fn delete_name(&self, name_id: &str) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.delete_name += 1;
        state.names.retain(|n| n.id != name_id);
        Ok(())
    }
}
