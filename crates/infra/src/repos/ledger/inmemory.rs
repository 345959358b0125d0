use super::ILedgerRepo;
use crate::repos::shared::inmemory_repo::{find_and_delete_by, find_by};
use crate::repos::shared::repo::DeleteResult;
use pirouette_domain::{LedgerEntry, ID};

pub struct InMemoryLedgerRepo {
    entries: std::sync::Mutex<Vec<LedgerEntry>>,
}

impl InMemoryLedgerRepo {
    pub fn new() -> Self {
        Self {
            entries: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ILedgerRepo for InMemoryLedgerRepo {
    async fn try_claim(&self, entry: &LedgerEntry) -> anyhow::Result<bool> {
        // The lock stands in for the unique index on
        // (user_uid, workshop_slug, kind): membership check and insert are
        // one atomic step.
        let mut entries = self.entries.lock().unwrap();
        let exists = entries.iter().any(|e| {
            e.user_id == entry.user_id
                && e.workshop_slug == entry.workshop_slug
                && e.kind == entry.kind
        });
        if exists {
            return Ok(false);
        }
        entries.push(entry.clone());
        Ok(true)
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<LedgerEntry> {
        find_by(&self.entries, |e| e.user_id == *user_id)
    }

    async fn delete_created_before(
        &self,
        horizon_millis: i64,
        protected_slugs: &[String],
    ) -> anyhow::Result<DeleteResult> {
        let deleted = find_and_delete_by(&self.entries, |e| {
            e.created_at < horizon_millis && !protected_slugs.contains(&e.workshop_slug)
        });
        Ok(DeleteResult {
            deleted_count: deleted.len() as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pirouette_domain::{NotificationKind, Workshop};

    fn workshop_factory(slug: &str) -> Workshop {
        Workshop {
            id: Default::default(),
            slug: slug.into(),
            title: "Bachata Weekender".into(),
            organizer_ids: vec![Default::default()],
            sessions: Vec::new(),
            prices: Vec::new(),
            available: true,
            created: 0,
            updated: 0,
        }
    }

    fn entry_factory(user_id: &ID, slug: &str, kind: NotificationKind) -> LedgerEntry {
        LedgerEntry::new(
            user_id.clone(),
            &workshop_factory(slug),
            kind,
            "title".into(),
            "body".into(),
            100,
        )
    }

    #[tokio::test]
    async fn claims_once_per_triple() {
        let repo = InMemoryLedgerRepo::new();
        let user_id = ID::default();
        let entry = entry_factory(&user_id, "w-1", NotificationKind::NewWorkshop);

        assert!(repo.try_claim(&entry).await.unwrap());
        assert!(!repo.try_claim(&entry).await.unwrap());

        // A different kind for the same workshop is a separate claim
        let entry = entry_factory(&user_id, "w-1", NotificationKind::PriceDrop);
        assert!(repo.try_claim(&entry).await.unwrap());

        assert_eq!(repo.find_by_user(&user_id).await.len(), 2);
    }

    #[tokio::test]
    async fn concurrent_claims_have_one_winner() {
        let repo = InMemoryLedgerRepo::new();
        let user_id = ID::default();
        let entry = entry_factory(&user_id, "w-1", NotificationKind::NewWorkshop);

        let (a, b) = futures::join!(repo.try_claim(&entry), repo.try_claim(&entry));
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(a != b, "exactly one of two concurrent claims must win");
        assert_eq!(repo.find_by_user(&user_id).await.len(), 1);
    }

    #[tokio::test]
    async fn purge_spares_protected_slugs() {
        let repo = InMemoryLedgerRepo::new();
        let user_id = ID::default();
        let old = entry_factory(&user_id, "w-old", NotificationKind::NewWorkshop);
        let upcoming = entry_factory(&user_id, "w-upcoming", NotificationKind::NewWorkshop);
        repo.try_claim(&old).await.unwrap();
        repo.try_claim(&upcoming).await.unwrap();

        let res = repo
            .delete_created_before(200, &["w-upcoming".to_string()])
            .await
            .unwrap();
        assert_eq!(res.deleted_count, 1);

        let remaining = repo.find_by_user(&user_id).await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].workshop_slug, "w-upcoming");
    }
}
