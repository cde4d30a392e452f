use chrono::{DateTime, Utc};

use super::model::User;

/// A table column. Sortable columns name the field sent as `order`.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub title: &'static str,
    pub field: &'static str,
    pub cell: fn(&User, DateTime<Utc>) -> String,
}

pub const USER_COLUMNS: &[Column] = &[
    Column {
        title: "Name",
        field: "name",
        cell: name_cell,
    },
    Column {
        title: "Groups",
        field: "groups",
        cell: groups_cell,
    },
    Column {
        title: "Joined",
        field: "created_at",
        cell: joined_cell,
    },
    Column {
        title: "Last Active At",
        field: "active_at",
        cell: active_cell,
    },
];

fn name_cell(user: &User, _now: DateTime<Utc>) -> String {
    format!("{} <{}>", user.name, user.email)
}

fn groups_cell(user: &User, _now: DateTime<Utc>) -> String {
    user.groups
        .iter()
        .map(|group| group.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn joined_cell(user: &User, now: DateTime<Utc>) -> String {
    time_ago(Some(user.created_at), now)
}

fn active_cell(user: &User, now: DateTime<Utc>) -> String {
    time_ago(user.active_at, now)
}

pub fn time_ago(at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(at) = at else {
        return "never".to_string();
    };
    let elapsed = now.signed_duration_since(at);
    let (amount, unit) = if elapsed.num_minutes() < 1 {
        return "just now".to_string();
    } else if elapsed.num_hours() < 1 {
        (elapsed.num_minutes(), "minute")
    } else if elapsed.num_days() < 1 {
        (elapsed.num_hours(), "hour")
    } else if elapsed.num_days() < 30 {
        (elapsed.num_days(), "day")
    } else if elapsed.num_days() < 365 {
        (elapsed.num_days() / 30, "month")
    } else {
        (elapsed.num_days() / 365, "year")
    };
    let plural = if amount == 1 { "" } else { "s" };
    format!("{amount} {unit}{plural} ago")
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn time_ago_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(time_ago(None, now), "never");
        assert_eq!(time_ago(Some(now - Duration::seconds(20)), now), "just now");
        assert_eq!(time_ago(Some(now - Duration::minutes(1)), now), "1 minute ago");
        assert_eq!(time_ago(Some(now - Duration::hours(5)), now), "5 hours ago");
        assert_eq!(time_ago(Some(now - Duration::days(3)), now), "3 days ago");
        assert_eq!(time_ago(Some(now - Duration::days(400)), now), "1 year ago");
    }

    #[test]
    fn every_column_is_sortable_by_a_distinct_field() {
        let mut fields: Vec<_> = USER_COLUMNS.iter().map(|column| column.field).collect();
        fields.dedup();
        assert_eq!(fields, vec!["name", "groups", "created_at", "active_at"]);
    }
}
