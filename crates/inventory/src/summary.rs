//! Stock aggregation for the dashboard.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{AnimalCategory, TransactionRecord};

/// Inbound and outbound totals of a group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub inbound: u64,
    pub outbound: u64,
}

impl Totals {
    /// Animals currently in stock; negative when more left than arrived.
    pub fn net(&self) -> i64 {
        self.inbound as i64 - self.outbound as i64
    }

    fn add(&mut self, other: Totals) {
        self.inbound += other.inbound;
        self.outbound += other.outbound;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub animal_type: String,
    pub category: String,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VendorKey {
    pub vendor: String,
    pub animal_type: String,
    pub category: String,
}

/// What a vendor delivered of one animal type and category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Deliveries {
    pub delivered: u64,
    pub deliveries: u32,
}

/// Net stock per animal type and category, recomputed on every render,
/// with daily movements and inbound deliveries per vendor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AggregateSummary {
    groups: BTreeMap<GroupKey, Totals>,
    daily: BTreeMap<NaiveDate, Totals>,
    vendors: BTreeMap<VendorKey, Deliveries>,
}

impl AggregateSummary {
    pub fn from_records(inbound: &[TransactionRecord], outbound: &[TransactionRecord]) -> Self {
        let mut summary = Self::default();
        for record in inbound {
            let quantity = u64::from(record.quantity);
            summary.groups.entry(key(record)).or_default().inbound += quantity;
            summary.daily.entry(record.date).or_default().inbound += quantity;

            // Inbound rows without a vendor still count toward stock.
            if let Some(vendor) = &record.vendor {
                let entry = summary
                    .vendors
                    .entry(VendorKey {
                        vendor: vendor.clone(),
                        animal_type: record.animal_type.clone(),
                        category: record.category.clone(),
                    })
                    .or_default();
                entry.delivered += quantity;
                entry.deliveries += 1;
            }
        }
        for record in outbound {
            let quantity = u64::from(record.quantity);
            summary.groups.entry(key(record)).or_default().outbound += quantity;
            summary.daily.entry(record.date).or_default().outbound += quantity;
        }
        summary
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn totals(&self, animal_type: &str, category: &str) -> Totals {
        self.groups
            .get(&GroupKey {
                animal_type: animal_type.to_string(),
                category: category.to_string(),
            })
            .copied()
            .unwrap_or_default()
    }

    pub fn net(&self, animal_type: &str, category: &str) -> i64 {
        self.totals(animal_type, category).net()
    }

    pub fn groups(&self) -> impl Iterator<Item = (&GroupKey, &Totals)> {
        self.groups.iter()
    }

    /// Animals in and out per date, oldest first.
    pub fn by_date(&self) -> impl Iterator<Item = (&NaiveDate, &Totals)> {
        self.daily.iter()
    }

    /// Inbound deliveries per vendor, animal type and category.
    pub fn by_vendor(&self) -> impl Iterator<Item = (&VendorKey, &Deliveries)> {
        self.vendors.iter()
    }

    /// Totals summed over the categories of each animal type.
    pub fn by_animal(&self) -> BTreeMap<String, Totals> {
        let mut out: BTreeMap<String, Totals> = BTreeMap::new();
        for (key, totals) in &self.groups {
            out.entry(key.animal_type.clone()).or_default().add(*totals);
        }
        out
    }

    /// Estimated live weight of the net stock of a group, using the nominal
    /// weight of its category. `None` when the category is not configured.
    pub fn estimated_weight(&self, key: &GroupKey, categories: &[AnimalCategory]) -> Option<f64> {
        let weight = categories.iter().find(|c| c.name == key.category)?.weight;
        let net = self.groups.get(key).map(Totals::net).unwrap_or_default();
        Some(net as f64 * weight)
    }
}

fn key(record: &TransactionRecord) -> GroupKey {
    GroupKey {
        animal_type: record.animal_type.clone(),
        category: record.category.clone(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;

    use super::*;

    fn rec(animal: &str, category: &str, quantity: u32) -> TransactionRecord {
        TransactionRecord {
            date: NaiveDate::from_ymd_opt(2025, 6, 6).unwrap(),
            animal_type: animal.to_string(),
            category: category.to_string(),
            quantity,
            notes: None,
            receipt_url: None,
            vendor: None,
            receipt_number: None,
        }
    }

    #[test]
    fn net_is_inbound_minus_outbound() {
        let summary = AggregateSummary::from_records(
            &[rec("Goat", "Small", 5), rec("Goat", "Small", 3)],
            &[rec("Goat", "Small", 2)],
        );
        assert_eq!(summary.net("Goat", "Small"), 6);
        assert_eq!(
            summary.totals("Goat", "Small"),
            Totals {
                inbound: 8,
                outbound: 2
            }
        );
    }

    #[test]
    fn groups_are_separate() {
        let summary = AggregateSummary::from_records(
            &[rec("Goat", "Small", 5), rec("Goat", "Large", 1), rec("Cow", "A", 2)],
            &[rec("Cow", "A", 3)],
        );
        assert_eq!(summary.net("Goat", "Large"), 1);
        assert_eq!(summary.net("Cow", "A"), -1);
        assert_eq!(summary.net("Cow", "B"), 0);

        let by_animal = summary.by_animal();
        assert_eq!(by_animal["Goat"].inbound, 6);
        assert_eq!(by_animal["Cow"].net(), -1);
    }

    #[test]
    fn empty_when_no_records() {
        let summary = AggregateSummary::from_records(&[], &[]);
        assert!(summary.is_empty());
        assert!(summary.by_animal().is_empty());
        assert_eq!(summary.by_date().count(), 0);
        assert_eq!(summary.by_vendor().count(), 0);
    }

    fn on(day: u32, mut record: TransactionRecord) -> TransactionRecord {
        record.date = NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
        record
    }

    fn from(vendor: &str, mut record: TransactionRecord) -> TransactionRecord {
        record.vendor = Some(vendor.to_string());
        record
    }

    #[test]
    fn daily_totals_are_per_date_in_order() {
        let summary = AggregateSummary::from_records(
            &[
                on(7, rec("Goat", "Small", 2)),
                on(5, rec("Cow", "A", 1)),
                on(7, rec("Goat", "Large", 3)),
            ],
            &[on(9, rec("Goat", "Small", 4))],
        );
        let days: Vec<_> = summary.by_date().map(|(d, t)| (d.day(), *t)).collect();
        assert_eq!(
            days,
            [
                (5, Totals { inbound: 1, outbound: 0 }),
                (7, Totals { inbound: 5, outbound: 0 }),
                (9, Totals { inbound: 0, outbound: 4 }),
            ]
        );
    }

    #[test]
    fn vendor_deliveries_count_inbound_only() {
        let summary = AggregateSummary::from_records(
            &[
                from("Pak Budi", rec("Goat", "Small", 5)),
                from("Pak Budi", rec("Goat", "Small", 2)),
                from("Pak Budi", rec("Cow", "A", 1)),
                from("Bu Sri", rec("Goat", "Small", 4)),
                rec("Goat", "Small", 9),
            ],
            &[from("Pak Budi", rec("Goat", "Small", 3))],
        );
        let vendors: Vec<_> = summary
            .by_vendor()
            .map(|(k, d)| (k.vendor.as_str(), k.animal_type.as_str(), d.delivered, d.deliveries))
            .collect();
        assert_eq!(
            vendors,
            [
                ("Bu Sri", "Goat", 4, 1),
                ("Pak Budi", "Cow", 1, 1),
                ("Pak Budi", "Goat", 7, 2),
            ]
        );
        assert_eq!(summary.net("Goat", "Small"), 17);
    }

    #[test]
    fn weight_uses_category_nominal_weight() {
        let summary = AggregateSummary::from_records(&[rec("Goat", "Small", 4)], &[]);
        let categories = vec![AnimalCategory {
            name: "Small".to_string(),
            weight: 22.5,
        }];
        let key = GroupKey {
            animal_type: "Goat".to_string(),
            category: "Small".to_string(),
        };
        assert_eq!(summary.estimated_weight(&key, &categories), Some(90.0));
        assert_eq!(summary.estimated_weight(&key, &[]), None);
    }
}
