use pirouette_domain::ID;
use pirouette_infra::NotifierContext;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Recipient {
    pub user_id: ID,
    pub address: String,
}

/// Resolves the recipients for a workshop: the union of enabled subscribers
/// across its organizers, de-duplicated by user. Users without a device
/// token never granted push permissions and are dropped here.
pub async fn resolve_audience(
    organizer_ids: &[ID],
    ctx: &NotifierContext,
) -> anyhow::Result<Vec<Recipient>> {
    let subscriptions = ctx
        .repos
        .subscriptions
        .find_by_organizers(organizer_ids)
        .await?;

    let mut by_user: HashMap<ID, Recipient> = HashMap::new();
    for subscription in subscriptions {
        if !subscription.enabled || subscription.device_token.is_empty() {
            continue;
        }
        by_user
            .entry(subscription.user_id.clone())
            .or_insert_with(|| Recipient {
                user_id: subscription.user_id.clone(),
                address: subscription.device_token.clone(),
            });
    }

    Ok(by_user.into_iter().map(|(_, r)| r).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pirouette_domain::Subscription;

    fn subscription_factory(user_id: &ID, organizer_id: &ID, token: &str) -> Subscription {
        Subscription {
            user_id: user_id.clone(),
            organizer_id: organizer_id.clone(),
            enabled: true,
            device_token: token.into(),
        }
    }

    #[tokio::test]
    async fn unions_and_dedups_across_organizers() {
        let ctx = NotifierContext::create_inmemory();
        let organizer_1 = ID::default();
        let organizer_2 = ID::default();
        let user = ID::default();
        let other_user = ID::default();

        // Same user follows both organizers of the workshop
        for organizer in &[&organizer_1, &organizer_2] {
            ctx.repos
                .subscriptions
                .insert(&subscription_factory(&user, organizer, "token-a"))
                .await
                .unwrap();
        }
        ctx.repos
            .subscriptions
            .insert(&subscription_factory(&other_user, &organizer_2, "token-b"))
            .await
            .unwrap();

        let mut audience =
            resolve_audience(&[organizer_1.clone(), organizer_2.clone()], &ctx)
                .await
                .unwrap();
        audience.sort_by(|a, b| a.address.cmp(&b.address));

        assert_eq!(audience.len(), 2);
        assert_eq!(audience[0].user_id, user);
        assert_eq!(audience[1].user_id, other_user);
    }

    #[tokio::test]
    async fn drops_disabled_and_tokenless_subscribers() {
        let ctx = NotifierContext::create_inmemory();
        let organizer = ID::default();

        let mut disabled = subscription_factory(&ID::default(), &organizer, "token-c");
        disabled.enabled = false;
        ctx.repos.subscriptions.insert(&disabled).await.unwrap();

        let tokenless = subscription_factory(&ID::default(), &organizer, "");
        ctx.repos.subscriptions.insert(&tokenless).await.unwrap();

        let audience = resolve_audience(&[organizer], &ctx).await.unwrap();
        assert!(audience.is_empty());
    }

    #[tokio::test]
    async fn ignores_unrelated_organizers() {
        let ctx = NotifierContext::create_inmemory();
        let organizer = ID::default();
        ctx.repos
            .subscriptions
            .insert(&subscription_factory(&ID::default(), &organizer, "token-d"))
            .await
            .unwrap();

        let audience = resolve_audience(&[ID::default()], &ctx).await.unwrap();
        assert!(audience.is_empty());
    }
}
