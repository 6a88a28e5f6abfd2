use crate::record::{ListQuery, RecordClient, RecordId, SortType, Table};
use crate::schema::to_record;

use super::model::{TeamMember, TeamMemberInput};

pub const TEAM_TABLE: Table = Table {
    name: "team_member_c",
    fields: &["Name", "Name_c", "Email_c", "Role_c", "Avatar_c"],
};

#[derive(Clone)]
pub struct TeamService {
    client: RecordClient,
}

impl TeamService {
    pub fn new(client: RecordClient) -> Self {
        Self { client }
    }

    pub async fn get_all(&self) -> Vec<TeamMember> {
        let query = ListQuery::new().order_by("Id", SortType::Asc);
        self.client.list(&TEAM_TABLE, &query).await
    }

    pub async fn get_by_id(&self, id: RecordId) -> Option<TeamMember> {
        self.client.get_by_id(&TEAM_TABLE, id).await
    }

    pub async fn create(&self, input: &TeamMemberInput) -> Option<TeamMember> {
        self.client.create(&TEAM_TABLE, vec![to_record(input)]).await
    }

    pub async fn update(&self, id: RecordId, input: &TeamMemberInput) -> Option<TeamMember> {
        self.client.update(&TEAM_TABLE, id, to_record(input)).await
    }

    pub async fn delete(&self, id: RecordId) -> bool {
        self.client.delete(&TEAM_TABLE, &[id]).await
    }
}
