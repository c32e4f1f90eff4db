//! Cell-arrival evaluation for items, switches and doors.

use std::collections::{BTreeMap, BTreeSet};

use doors_maze_core::{DoorCondition, ItemCategory, LevelDefinition, SwitchState};

/// Items, badges and switch states gathered during the current level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    items: BTreeSet<String>,
    badges: BTreeSet<String>,
    switches: BTreeMap<String, SwitchState>,
}

impl Inventory {
    /// Plain items collected so far.
    #[must_use]
    pub fn items(&self) -> &BTreeSet<String> {
        &self.items
    }

    /// Badges collected so far.
    #[must_use]
    pub fn badges(&self) -> &BTreeSet<String> {
        &self.badges
    }

    /// Last recorded state of every switch toggled so far.
    #[must_use]
    pub fn switches(&self) -> &BTreeMap<String, SwitchState> {
        &self.switches
    }

    /// Reports whether an item or badge with the identifier was collected.
    #[must_use]
    pub fn holds(&self, id: &str) -> bool {
        self.items.contains(id) || self.badges.contains(id)
    }

    pub(crate) fn collect(&mut self, id: &str) -> ItemCategory {
        let category = ItemCategory::classify(id);
        let set = match category {
            ItemCategory::Item => &mut self.items,
            ItemCategory::Badge => &mut self.badges,
        };
        let _ = set.insert(id.to_owned());
        category
    }

    pub(crate) fn record_switch(&mut self, id: &str, state: SwitchState) {
        let _ = self.switches.insert(id.to_owned(), state);
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
        self.badges.clear();
        self.switches.clear();
    }
}

/// Outcome of testing a door's unlock condition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum DoorVerdict {
    Open { message: String },
    Locked { reason: String },
}

pub(crate) fn judge_door<F>(
    level: &LevelDefinition,
    condition: &DoorCondition,
    inventory: &Inventory,
    switch_state: F,
) -> DoorVerdict
where
    F: Fn(&str) -> Option<SwitchState>,
{
    let subject = condition.subject();
    let label = display_name(level, subject);
    let satisfied = match condition {
        DoorCondition::HasItem(id) => inventory.items().contains(id),
        DoorCondition::HasBadge(id) => inventory.badges().contains(id),
        DoorCondition::SwitchOn(id) => switch_state(id) == Some(SwitchState::On),
    };

    if satisfied {
        return DoorVerdict::Open {
            message: format!("{label} opened the door!"),
        };
    }

    let reason = match condition {
        DoorCondition::HasItem(_) | DoorCondition::HasBadge(_) => format!("{label} is needed"),
        DoorCondition::SwitchOn(_) => format!("Turn {label} ON"),
    };
    DoorVerdict::Locked { reason }
}

/// Message narrated when an unlockable door is not the task's target.
pub(crate) const WRONG_DOOR_MESSAGE: &str = "That is not the right door! Check the task again.";

fn display_name<'a>(level: &'a LevelDefinition, id: &'a str) -> &'a str {
    level
        .items
        .iter()
        .find(|item| item.id == id)
        .map(|item| item.name.as_str())
        .or_else(|| {
            level
                .switches
                .iter()
                .find(|switch| switch.id == id)
                .map(|switch| switch.name.as_str())
        })
        .unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use doors_maze_core::{CellCoord, CellKind, Grid, ItemDef, SwitchDef};

    fn level() -> LevelDefinition {
        LevelDefinition {
            id: "unit".to_owned(),
            grid: Grid::new(4, 1, CellKind::Floor),
            start: CellCoord::new(0, 0),
            items: vec![ItemDef {
                id: "key-red".to_owned(),
                cell: CellCoord::new(1, 0),
                icon: "key".to_owned(),
                name: "Red key".to_owned(),
            }],
            switches: vec![SwitchDef {
                id: "switch-green".to_owned(),
                cell: CellCoord::new(2, 0),
                icon: "button".to_owned(),
                name: "Green switch".to_owned(),
                initial: SwitchState::Off,
            }],
            doors: Vec::new(),
            target_door: "left".to_owned(),
        }
    }

    #[test]
    fn badges_and_items_are_filed_separately() {
        let mut inventory = Inventory::default();
        assert_eq!(inventory.collect("key-red"), ItemCategory::Item);
        assert_eq!(inventory.collect("badge-star"), ItemCategory::Badge);

        assert!(inventory.items().contains("key-red"));
        assert!(inventory.badges().contains("badge-star"));
        assert!(!inventory.items().contains("badge-star"));
        assert!(inventory.holds("badge-star"));
    }

    #[test]
    fn missing_item_reports_display_name() {
        let verdict = judge_door(
            &level(),
            &DoorCondition::HasItem("key-red".to_owned()),
            &Inventory::default(),
            |_| None,
        );
        assert_eq!(
            verdict,
            DoorVerdict::Locked {
                reason: "Red key is needed".to_owned()
            }
        );
    }

    #[test]
    fn switch_condition_reads_live_state() {
        let condition = DoorCondition::SwitchOn("switch-green".to_owned());
        let locked = judge_door(&level(), &condition, &Inventory::default(), |_| {
            Some(SwitchState::Off)
        });
        assert_eq!(
            locked,
            DoorVerdict::Locked {
                reason: "Turn Green switch ON".to_owned()
            }
        );

        let open = judge_door(&level(), &condition, &Inventory::default(), |_| {
            Some(SwitchState::On)
        });
        assert_eq!(
            open,
            DoorVerdict::Open {
                message: "Green switch opened the door!".to_owned()
            }
        );
    }

    #[test]
    fn badge_condition_ignores_plain_items() {
        let mut inventory = Inventory::default();
        let _ = inventory.collect("key-red");
        let verdict = judge_door(
            &level(),
            &DoorCondition::HasBadge("key-red".to_owned()),
            &inventory,
            |_| None,
        );
        assert!(matches!(verdict, DoorVerdict::Locked { .. }));
    }
}
