//! Subscription edit form mapping. Data-size quotas are stored in bytes and edited in GiB.

use serde::{Deserialize, Serialize};

pub const BYTES_IN_GIB: f64 = 1_073_741_824.0;

/// Resource unit whose quotas are converted between bytes and GiB.
pub const UNIT_BYTES: &str = "bytes";

pub fn bytes_to_gib(bytes: f64) -> f64 {
    bytes / BYTES_IN_GIB
}

pub fn gib_to_bytes(gib: f64) -> f64 {
    gib * BYTES_IN_GIB
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceType {
    #[serde(default)]
    pub name: String,
    pub unit: String,
}

impl ResourceType {
    pub fn is_bytes(&self) -> bool {
        self.unit.eq_ignore_ascii_case(UNIT_BYTES)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionUser {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quota {
    pub quota: f64,
    pub resource_type: ResourceType,
}

/// Subscription as returned by the subscriptions service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub user: SubscriptionUser,
    pub paid: bool,
    pub plan: Plan,
    #[serde(default)]
    pub quotas: Vec<Quota>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionFormValues {
    pub username: String,
    pub paid: bool,
    pub plan_name: String,
    pub quotas: Vec<Quota>,
}

impl Default for SubscriptionFormValues {
    fn default() -> Self {
        Self {
            username: String::new(),
            paid: true,
            plan_name: String::new(),
            quotas: Vec::new(),
        }
    }
}

impl SubscriptionFormValues {
    /// Initial form values. Without a subscription (new subscription form) the defaults apply.
    pub fn from_subscription(subscription: Option<&Subscription>) -> Self {
        let Some(subscription) = subscription else {
            return Self::default();
        };
        Self {
            username: subscription.user.username.clone(),
            paid: subscription.paid,
            plan_name: subscription.plan.name.clone(),
            quotas: subscription
                .quotas
                .iter()
                .map(|q| Quota {
                    quota: if q.resource_type.is_bytes() { bytes_to_gib(q.quota) } else { q.quota },
                    resource_type: q.resource_type.clone(),
                })
                .collect(),
        }
    }
}

/// Body for creating or updating a subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionSubmission {
    pub username: String,
    pub plan_name: String,
    pub paid: bool,
}

pub fn format_subscription(values: &SubscriptionFormValues) -> SubscriptionSubmission {
    SubscriptionSubmission {
        username: values.username.clone(),
        plan_name: values.plan_name.clone(),
        paid: values.paid,
    }
}

/// Converts the data-size quota back from GiB to bytes for submission.
/// Only the first byte-unit quota is converted.
pub fn format_quotas(mut values: SubscriptionFormValues) -> SubscriptionFormValues {
    if let Some(quota) = values.quotas.iter_mut().find(|q| q.resource_type.is_bytes()) {
        quota.quota = gib_to_bytes(quota.quota);
    }
    values
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Addon {
    pub name: String,
    pub resource_type: ResourceType,
}

/// An add-on attached to a subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubAddon {
    pub uuid: String,
    pub addon: Addon,
    pub amount: f64,
    pub paid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonFormValue {
    pub uuid: String,
    pub name: String,
    pub amount: f64,
    pub paid: bool,
    /// Unit of the add-on's resource type.
    pub resource_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddonFormValues {
    pub addons: Vec<AddonFormValue>,
}

impl AddonFormValues {
    pub fn from_sub_addons(selected: &[SubAddon]) -> Self {
        Self {
            addons: selected
                .iter()
                .map(|sub| AddonFormValue {
                    uuid: sub.uuid.clone(),
                    name: sub.addon.name.clone(),
                    amount: if sub.addon.resource_type.is_bytes() {
                        bytes_to_gib(sub.amount)
                    } else {
                        sub.amount
                    },
                    paid: sub.paid,
                    resource_type: sub.addon.resource_type.unit.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonSubmission {
    pub uuid: String,
}

pub fn format_sub_addon_submission(addon_uuid: &str) -> AddonSubmission {
    AddonSubmission { uuid: addon_uuid.to_string() }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonUpdate {
    pub amount: f64,
    pub paid: bool,
}

/// Update body for the selected add-on, taken from its row in the form. `None` if the row is gone.
pub fn format_updated_addon_submission(
    values: &AddonFormValues,
    selected: &SubAddon,
) -> Option<AddonUpdate> {
    let row = values.addons.iter().find(|a| a.uuid == selected.uuid)?;
    let amount = if selected.addon.resource_type.is_bytes() {
        gib_to_bytes(row.amount)
    } else {
        row.amount
    };
    Some(AddonUpdate { amount, paid: row.paid })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes_type() -> ResourceType {
        ResourceType { name: "data.size".into(), unit: "bytes".into() }
    }

    fn cpu_type() -> ResourceType {
        ResourceType { name: "cpu.hours".into(), unit: "cpu hours".into() }
    }

    fn subscription() -> Subscription {
        Subscription {
            user: SubscriptionUser { username: "ipcdev".into() },
            paid: false,
            plan: Plan { name: "Pro".into() },
            quotas: vec![
                Quota { quota: 20_000.0, resource_type: cpu_type() },
                Quota { quota: 2.0 * BYTES_IN_GIB, resource_type: bytes_type() },
            ],
        }
    }

    #[test]
    fn test_defaults_without_subscription() {
        let values = SubscriptionFormValues::from_subscription(None);
        assert_eq!(values, SubscriptionFormValues::default());
        assert!(values.paid);
    }

    #[test]
    fn test_quota_bytes_shown_in_gib_and_submitted_in_bytes() {
        let values = SubscriptionFormValues::from_subscription(Some(&subscription()));
        assert_eq!(values.username, "ipcdev");
        assert_eq!(values.plan_name, "Pro");
        assert!(!values.paid);
        assert_eq!(values.quotas[0].quota, 20_000.0);
        assert_eq!(values.quotas[1].quota, 2.0);

        let submitted = format_quotas(values.clone());
        assert_eq!(submitted.quotas[0].quota, 20_000.0);
        assert_eq!(submitted.quotas[1].quota, 2.0 * BYTES_IN_GIB);

        let body = format_subscription(&values);
        assert_eq!(body.username, "ipcdev");
        assert_eq!(body.plan_name, "Pro");
    }

    #[test]
    fn test_format_quotas_without_bytes_quota_is_unchanged() {
        let values = SubscriptionFormValues {
            quotas: vec![Quota { quota: 5.0, resource_type: cpu_type() }],
            ..Default::default()
        };
        assert_eq!(format_quotas(values.clone()), values);
    }

    #[test]
    fn test_addon_amounts() {
        let storage = SubAddon {
            uuid: "u-1".into(),
            addon: Addon { name: "1 TB".into(), resource_type: ResourceType { name: String::new(), unit: "Bytes".into() } },
            amount: 1024.0 * BYTES_IN_GIB,
            paid: true,
        };
        let cpu = SubAddon {
            uuid: "u-2".into(),
            addon: Addon { name: "CPU".into(), resource_type: cpu_type() },
            amount: 100.0,
            paid: false,
        };
        let mut values = AddonFormValues::from_sub_addons(&[storage.clone(), cpu.clone()]);
        assert_eq!(values.addons[0].amount, 1024.0);
        assert_eq!(values.addons[0].resource_type, "Bytes");
        assert_eq!(values.addons[1].amount, 100.0);

        values.addons[0].amount = 2048.0;
        let update = format_updated_addon_submission(&values, &storage).unwrap();
        assert_eq!(update.amount, 2048.0 * BYTES_IN_GIB);
        assert!(update.paid);

        let update = format_updated_addon_submission(&values, &cpu).unwrap();
        assert_eq!(update, AddonUpdate { amount: 100.0, paid: false });

        let gone = SubAddon { uuid: "u-3".into(), ..cpu };
        assert!(format_updated_addon_submission(&values, &gone).is_none());
        assert_eq!(format_sub_addon_submission("a-9").uuid, "a-9");
    }
}
