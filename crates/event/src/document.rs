use serde::Serialize;
use ulid::Ulid;

use crate::{Category, EventDate, EventTime, MemberSet};

/// The stored event. Every write replaces the whole document and bumps
/// `revision`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDocument {
    pub id: Ulid,
    pub owner: Ulid,
    pub title: String,
    pub description: String,
    pub organized_by: String,
    pub event_date: EventDate,
    pub event_time: EventTime,
    pub location: String,
    pub category: Category,
    pub ticket_price: f64,
    pub quantity: i64,
    pub image: Option<String>,
    pub likes: i64,
    pub liked_by: MemberSet,
    pub participants: MemberSet,
    pub booking_count: i64,
    pub income: f64,
    #[serde(skip)]
    pub revision: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggled {
    /// Whether the user is in the set after the toggle.
    pub active: bool,
    pub count: usize,
}

impl EventDocument {
    /// Flips the user's like. `likes` moves by exactly one in the same
    /// direction as the `liked_by` change.
    pub fn toggle_like(&mut self, user_id: Ulid) -> Toggled {
        let active = self.liked_by.toggle(user_id);
        self.likes += if active { 1 } else { -1 };

        debug_assert_eq!(self.likes, self.liked_by.len() as i64);

        Toggled {
            active,
            count: self.liked_by.len(),
        }
    }

    pub fn toggle_participation(&mut self, user_id: Ulid) -> Toggled {
        let active = self.participants.toggle(user_id);

        Toggled {
            active,
            count: self.participants.len(),
        }
    }

    pub fn is_owned_by(&self, user_id: &Ulid) -> bool {
        &self.owner == user_id
    }
}
