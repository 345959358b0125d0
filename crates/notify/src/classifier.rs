use pirouette_domain::{NotificationKind, Workshop};

/// Decides whether the difference between two consecutive images of a
/// workshop warrants a notification, and of which kind.
///
/// The ingestion pipeline rewrites every workshop wholesale a few times a
/// day, so most updates are noise. At most one kind is emitted per update,
/// first match wins:
/// 1. any session timing difference        -> `ScheduleChange`
/// 2. sold out -> open                     -> `Reopened`
/// 3. strict decrease of the minimum price -> `PriceDrop`
pub fn classify(before: &Workshop, after: &Workshop) -> Option<NotificationKind> {
    if before.sessions != after.sessions {
        return Some(NotificationKind::ScheduleChange);
    }
    if !before.available && after.available {
        return Some(NotificationKind::Reopened);
    }
    if let (Some(old_min), Some(new_min)) = (before.min_price(), after.min_price()) {
        if new_min < old_min {
            return Some(NotificationKind::PriceDrop);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pirouette_domain::{PriceTier, SessionSlot};

    fn workshop_factory() -> Workshop {
        Workshop {
            id: Default::default(),
            slug: "kizomba-weekend-2021-07".into(),
            title: "Kizomba Weekend".into(),
            organizer_ids: vec![Default::default()],
            sessions: vec![SessionSlot {
                day: 10,
                month: 7,
                year: 2021,
                start_time: 18 * 60,
                end_time: 20 * 60,
            }],
            prices: vec![
                PriceTier {
                    label: "Early bird".into(),
                    amount: 3000,
                },
                PriceTier {
                    label: "Door".into(),
                    amount: 4000,
                },
            ],
            available: true,
            created: 0,
            updated: 0,
        }
    }

    #[test]
    fn identical_images_are_noise() {
        let before = workshop_factory();
        assert_eq!(classify(&before, &before.clone()), None);
    }

    #[test]
    fn metadata_touchup_is_noise() {
        let before = workshop_factory();
        let mut after = before.clone();
        after.id = Default::default();
        after.title = "Kizomba Weekend ".into();
        after.updated = 999;
        assert_eq!(classify(&before, &after), None);
    }

    #[test]
    fn start_time_change_is_schedule_change() {
        let before = workshop_factory();
        let mut after = before.clone();
        after.sessions[0].start_time += 30;
        assert_eq!(classify(&before, &after), Some(NotificationKind::ScheduleChange));
    }

    #[test]
    fn moved_date_is_schedule_change() {
        let before = workshop_factory();
        let mut after = before.clone();
        after.sessions[0].day += 1;
        assert_eq!(classify(&before, &after), Some(NotificationKind::ScheduleChange));
    }

    #[test]
    fn added_session_is_schedule_change() {
        let before = workshop_factory();
        let mut after = before.clone();
        after.sessions.push(SessionSlot {
            day: 11,
            month: 7,
            year: 2021,
            start_time: 12 * 60,
            end_time: 14 * 60,
        });
        assert_eq!(classify(&before, &after), Some(NotificationKind::ScheduleChange));
    }

    #[test]
    fn sold_out_to_open_is_reopened() {
        let mut before = workshop_factory();
        before.available = false;
        let after = workshop_factory();
        assert_eq!(classify(&before, &after), Some(NotificationKind::Reopened));
    }

    #[test]
    fn open_to_sold_out_is_noise() {
        let before = workshop_factory();
        let mut after = before.clone();
        after.available = false;
        assert_eq!(classify(&before, &after), None);
    }

    #[test]
    fn lower_min_price_is_price_drop() {
        let before = workshop_factory();
        let mut after = before.clone();
        after.prices[0].amount = 2000;
        assert_eq!(classify(&before, &after), Some(NotificationKind::PriceDrop));
    }

    #[test]
    fn cheaper_non_minimum_tier_is_noise() {
        let before = workshop_factory();
        let mut after = before.clone();
        // Door price drops but stays above the early bird minimum
        after.prices[1].amount = 3500;
        assert_eq!(classify(&before, &after), None);
    }

    #[test]
    fn price_increase_is_noise() {
        let before = workshop_factory();
        let mut after = before.clone();
        after.prices[0].amount = 3200;
        assert_eq!(classify(&before, &after), None);
    }

    #[test]
    fn schedule_change_wins_over_reopened_and_price_drop() {
        let mut before = workshop_factory();
        before.available = false;
        let mut after = workshop_factory();
        after.sessions[0].day += 1;
        after.prices[0].amount = 1000;
        assert_eq!(classify(&before, &after), Some(NotificationKind::ScheduleChange));
    }

    #[test]
    fn reopened_wins_over_price_drop() {
        let mut before = workshop_factory();
        before.available = false;
        let mut after = workshop_factory();
        after.prices[0].amount = 1000;
        assert_eq!(classify(&before, &after), Some(NotificationKind::Reopened));
    }
}
