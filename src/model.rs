use chrono::NaiveDateTime;
#[cfg(feature = "ssr")]
use diesel::prelude::*;
#[cfg(feature = "ssr")]
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};

pub type ParticipantId = i32;
pub type UserId = i32;

/// One gifter -> giftee edge, used for both predictions and results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pair {
    pub gifter_id: ParticipantId,
    pub giftee_id: ParticipantId,
}

impl Pair {
    pub fn new(gifter_id: ParticipantId, giftee_id: ParticipantId) -> Self {
        Self {
            gifter_id,
            giftee_id,
        }
    }

    pub fn is_self_pair(&self) -> bool {
        self.gifter_id == self.giftee_id
    }
}

/// A prediction edge together with the user who made it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedPair {
    pub user_id: UserId,
    pub pair: Pair,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ssr", derive(Queryable, Selectable))]
#[cfg_attr(feature = "ssr", diesel(table_name = crate::schema::participants))]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub avatar_url: String,
}

#[cfg(feature = "ssr")]
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::participants)]
pub struct NewParticipant<'a> {
    pub name: &'a str,
    pub avatar_url: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ssr", derive(Queryable, Selectable))]
#[cfg_attr(feature = "ssr", diesel(table_name = crate::schema::users))]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub created_at: NaiveDateTime,
}

/// The part of a user the leaderboard needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ssr", derive(Queryable, Selectable))]
#[cfg_attr(feature = "ssr", diesel(table_name = crate::schema::users))]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
}

#[cfg(feature = "ssr")]
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub login_code: &'a str,
    // created_at uses default
}

#[cfg(feature = "ssr")]
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::sessions)]
pub struct NewSession {
    pub user_id: UserId,
    pub token: String,
    // created_at uses default
}

#[cfg(feature = "ssr")]
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::admin_sessions)]
pub struct NewAdminSession {
    pub token: String,
    // created_at uses default
}

#[cfg(feature = "ssr")]
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::predictions)]
#[diesel(check_for_backend(Sqlite))]
pub struct Prediction {
    pub id: i32,
    pub user_id: UserId,
    pub gifter_id: ParticipantId,
    pub giftee_id: ParticipantId,
    pub created_at: NaiveDateTime,
}

#[cfg(feature = "ssr")]
impl Prediction {
    pub fn pair(&self) -> Pair {
        Pair::new(self.gifter_id, self.giftee_id)
    }

    pub fn owned_pair(&self) -> OwnedPair {
        OwnedPair {
            user_id: self.user_id,
            pair: self.pair(),
        }
    }
}

#[cfg(feature = "ssr")]
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::predictions)]
pub struct NewPrediction {
    pub user_id: UserId,
    pub gifter_id: ParticipantId,
    pub giftee_id: ParticipantId,
    // created_at uses default
}

/// A row of the administrator-authored ground truth.
#[cfg(feature = "ssr")]
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::results)]
#[diesel(check_for_backend(Sqlite))]
pub struct ResultEdge {
    pub id: i32,
    pub gifter_id: ParticipantId,
    pub giftee_id: ParticipantId,
}

#[cfg(feature = "ssr")]
impl ResultEdge {
    pub fn pair(&self) -> Pair {
        Pair::new(self.gifter_id, self.giftee_id)
    }
}

#[cfg(feature = "ssr")]
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::results)]
pub struct NewResultEdge {
    pub gifter_id: ParticipantId,
    pub giftee_id: ParticipantId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ssr", derive(Queryable, Selectable))]
#[cfg_attr(feature = "ssr", diesel(table_name = crate::schema::cutoff_times))]
pub struct CutoffTime {
    pub id: i32,
    pub datetime: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

#[cfg(feature = "ssr")]
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::cutoff_times)]
pub struct NewCutoffTime {
    pub datetime: NaiveDateTime,
    // created_at uses default
}

/// The cutoff as seen by the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutoffStatus {
    pub cutoff: Option<NaiveDateTime>,
    pub is_open: bool,
}

impl CutoffStatus {
    /// Submissions are open strictly before the cutoff, and always when none is set.
    pub fn at(cutoff: Option<NaiveDateTime>, now: NaiveDateTime) -> Self {
        Self {
            cutoff,
            is_open: cutoff.map_or(true, |c| now < c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};

    #[test]
    fn test_cutoff_status() {
        let cutoff = NaiveDate::from_ymd_opt(2024, 12, 24)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();

        assert!(CutoffStatus::at(None, cutoff).is_open);
        assert!(CutoffStatus::at(Some(cutoff), cutoff - TimeDelta::seconds(1)).is_open);
        assert!(!CutoffStatus::at(Some(cutoff), cutoff).is_open);
    }
}
