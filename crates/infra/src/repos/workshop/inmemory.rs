use super::IWorkshopRepo;
use crate::repos::shared::inmemory_repo::{find_by, insert};
use pirouette_domain::Workshop;

pub struct InMemoryWorkshopRepo {
    workshops: std::sync::Mutex<Vec<Workshop>>,
}

impl InMemoryWorkshopRepo {
    pub fn new() -> Self {
        Self {
            workshops: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IWorkshopRepo for InMemoryWorkshopRepo {
    async fn insert(&self, workshop: &Workshop) -> anyhow::Result<()> {
        insert(workshop, &self.workshops);
        Ok(())
    }

    async fn save(&self, workshop: &Workshop) -> anyhow::Result<()> {
        let mut workshops = self.workshops.lock().unwrap();
        match workshops.iter_mut().find(|w| w.slug == workshop.slug) {
            Some(existing) => *existing = workshop.clone(),
            None => workshops.push(workshop.clone()),
        }
        Ok(())
    }

    async fn find_by_slug(&self, slug: &str) -> Option<Workshop> {
        let workshops = self.workshops.lock().unwrap();
        workshops.iter().find(|w| w.slug == slug).cloned()
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Workshop>> {
        Ok(find_by(&self.workshops, |_| true))
    }

    async fn find_with_next_session_in(
        &self,
        now_millis: i64,
        from_millis: i64,
        to_millis: i64,
    ) -> anyhow::Result<Vec<Workshop>> {
        Ok(find_by(&self.workshops, |w| {
            match w.nearest_session_start_after(now_millis) {
                Some(start) => start >= from_millis && start < to_millis,
                None => false,
            }
        }))
    }

    async fn delete_by_slug(&self, slug: &str) -> anyhow::Result<()> {
        let mut workshops = self.workshops.lock().unwrap();
        workshops.retain(|w| w.slug != slug);
        Ok(())
    }
}
