use super::ids::{AccountId, GroupId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    /// Current members in join order. The order breaks ties when pairing
    /// settlements.
    pub members: Vec<AccountId>,
}

impl Group {
    pub fn new(id: impl Into<GroupId>, name: impl Into<String>, members: Vec<AccountId>) -> Self {
        Group {
            id: id.into(),
            name: name.into(),
            members,
        }
    }

    pub fn is_member(&self, account_id: &AccountId) -> bool {
        self.members.iter().any(|m| m == account_id)
    }
}
