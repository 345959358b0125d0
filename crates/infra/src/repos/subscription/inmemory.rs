use super::ISubscriptionRepo;
use crate::repos::shared::inmemory_repo::{find_by, insert};
use pirouette_domain::{Subscription, ID};

pub struct InMemorySubscriptionRepo {
    subscriptions: std::sync::Mutex<Vec<Subscription>>,
}

impl InMemorySubscriptionRepo {
    pub fn new() -> Self {
        Self {
            subscriptions: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ISubscriptionRepo for InMemorySubscriptionRepo {
    async fn insert(&self, subscription: &Subscription) -> anyhow::Result<()> {
        insert(subscription, &self.subscriptions);
        Ok(())
    }

    async fn find_by_organizers(&self, organizer_ids: &[ID]) -> anyhow::Result<Vec<Subscription>> {
        Ok(find_by(&self.subscriptions, |s| {
            organizer_ids.contains(&s.organizer_id)
        }))
    }
}
