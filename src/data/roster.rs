//! Guild roster export. Every result carrying `result.response.clan.members`
//! is treated as one snapshot; lookups scan the snapshots in order.

use serde::Deserialize;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::data::loose::{self, OrderedMap};

#[derive(Debug, Clone, Deserialize)]
pub struct RawRosterExport {
    #[serde(default)]
    pub results: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClanMember {
    pub name: String,
    #[serde(rename = "clanRole", default, deserialize_with = "loose::opt_string")]
    pub clan_role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterSnapshot {
    /// Player id -> member, in export order.
    pub members: OrderedMap<ClanMember>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    pub snapshots: Vec<RosterSnapshot>,
}

const MEMBERS_POINTER: &str = "/result/response/clan/members";

impl RawRosterExport {
    /// Results without a clan member list are skipped; a malformed member
    /// list is an error naming the result index.
    pub fn into_roster(self) -> Result<Roster, String> {
        let mut snapshots = Vec::new();
        for (index, mut value) in self.results.into_iter().enumerate() {
            let Some(members) = value.pointer_mut(MEMBERS_POINTER).map(Value::take) else {
                continue;
            };
            let members = serde_json::from_value::<OrderedMap<ClanMember>>(members)
                .map_err(|err| format!("result {index} clan.members: {err}"))?;
            snapshots.push(RosterSnapshot { members });
        }
        Ok(Roster { snapshots })
    }
}

impl Roster {
    pub fn from_members(members: OrderedMap<ClanMember>) -> Self {
        Roster {
            snapshots: vec![RosterSnapshot { members }],
        }
    }

    /// First snapshot that knows the id wins.
    pub fn member(&self, player_id: &str) -> Option<&ClanMember> {
        self.snapshots
            .iter()
            .find_map(|snapshot| snapshot.members.get(player_id))
    }

    /// Active member ids across all snapshots, each exactly once, first-seen order.
    pub fn active_member_ids(&self, config: &EngineConfig) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for snapshot in &self.snapshots {
            for (id, member) in snapshot.members.iter() {
                if ids.contains(&id) {
                    continue;
                }
                // The earliest snapshot's view of a member decides its role.
                let first = self.member(id).unwrap_or(member);
                if config.is_active_role(first.clan_role.as_deref()) {
                    ids.push(id);
                }
            }
        }
        ids
    }
}
