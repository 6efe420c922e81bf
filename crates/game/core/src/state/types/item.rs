use std::collections::BTreeMap;

use bitflags::bitflags;

use super::common::Position;

bitflags! {
    /// Physical properties of an item lying on the ground.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ItemFlags: u8 {
        const MOVEABLE = 1 << 0;
        /// Creatures cannot be pathed through the tile.
        const BLOCK_PATH = 1 << 1;
        /// Nothing can enter the tile.
        const BLOCK_SOLID = 1 << 2;
    }
}

/// Identifier of a ground item instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemState {
    pub id: ItemId,
    pub type_id: u16,
    pub count: u16,
    pub flags: ItemFlags,
}

impl ItemState {
    /// Moveable items that obstruct walking, the ones monsters may push.
    pub fn is_pushable_blocker(&self) -> bool {
        self.flags.contains(ItemFlags::MOVEABLE)
            && self
                .flags
                .intersects(ItemFlags::BLOCK_PATH | ItemFlags::BLOCK_SOLID)
    }
}

/// Items stacked on tiles. The last entry of a stack is the topmost item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroundItems {
    stacks: BTreeMap<Position, Vec<ItemState>>,
    next_item_id: u32,
}

impl GroundItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops a new item on top of the stack at `position`.
    pub fn spawn(&mut self, position: Position, type_id: u16, count: u16, flags: ItemFlags) -> ItemId {
        self.next_item_id += 1;
        let id = ItemId(self.next_item_id);
        self.stacks.entry(position).or_default().push(ItemState {
            id,
            type_id,
            count,
            flags,
        });
        id
    }

    pub fn at(&self, position: Position) -> &[ItemState] {
        self.stacks.get(&position).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find(&self, id: ItemId) -> Option<(Position, &ItemState)> {
        self.stacks.iter().find_map(|(position, stack)| {
            stack
                .iter()
                .find(|item| item.id == id)
                .map(|item| (*position, item))
        })
    }

    /// True when any item on the tile has one of `flags`.
    pub fn any_with(&self, position: Position, flags: ItemFlags) -> bool {
        self.at(position).iter().any(|item| item.flags.intersects(flags))
    }

    /// True when a blocking item that cannot be pushed lies on the tile.
    pub fn has_fixed_blocker(&self, position: Position, flags: ItemFlags) -> bool {
        self.at(position)
            .iter()
            .any(|item| item.flags.intersects(flags) && !item.flags.contains(ItemFlags::MOVEABLE))
    }

    pub fn remove(&mut self, id: ItemId) -> Option<(Position, ItemState)> {
        let position = self.find(id).map(|(position, _)| position)?;
        let stack = self.stacks.get_mut(&position)?;
        let index = stack.iter().position(|item| item.id == id)?;
        let item = stack.remove(index);
        if stack.is_empty() {
            self.stacks.remove(&position);
        }
        Some((position, item))
    }

    /// Moves an item onto the top of another stack.
    pub fn relocate(&mut self, id: ItemId, to: Position) -> Option<Position> {
        let (from, item) = self.remove(id)?;
        self.stacks.entry(to).or_default().push(item);
        Some(from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relocate_moves_item_to_top_of_target_stack() {
        let mut ground = GroundItems::new();
        let from = Position::new(1, 1, 7);
        let to = Position::new(2, 1, 7);
        let crate_id = ground.spawn(from, 1739, 1, ItemFlags::MOVEABLE | ItemFlags::BLOCK_SOLID);
        ground.spawn(to, 100, 1, ItemFlags::empty());

        assert_eq!(ground.relocate(crate_id, to), Some(from));
        assert!(ground.at(from).is_empty());
        assert_eq!(ground.at(to).last().map(|item| item.id), Some(crate_id));
    }
}
