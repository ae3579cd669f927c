use std::fmt;

use crate::error::PriceListError;

pub const DEFAULT_SIZES: [u32; 6] = [20, 22, 24, 26, 28, 30];
pub const FIRST_SIZE: u32 = 20;
pub const SIZE_STEP: u32 = 2;
pub const DEFAULT_RATE: &str = "0.0";

pub const UNTITLED_PRICE_LIST: &str = "Untitled Price List";
pub const UNTITLED_CLOTH: &str = "Untitled Cloth";
pub const UNTITLED_TYPE: &str = "Untitled Type";

fn name_or<'a>(name: &'a str, placeholder: &'a str) -> &'a str {
    if name.trim().is_empty() { placeholder } else { name }
}

macro_rules! node_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u64);

        impl $name {
            pub fn raw(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

node_id!(PriceListId, "price-list");
node_id!(ClothId, "cloth");
node_id!(TypeNodeId, "type");

/// Any node in the tree, used where events and view flags need a common key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKey {
    PriceList(PriceListId),
    Cloth(ClothId),
    Type(TypeNodeId),
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::PriceList(id) => id.fmt(f),
            NodeKey::Cloth(id) => id.fmt(f),
            NodeKey::Type(id) => id.fmt(f),
        }
    }
}

/// What a mutation did to the tree. Structural changes require renumbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Edited,
    Structural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GarmentSize(u32);

pub fn default_sizes() -> Vec<GarmentSize> {
    DEFAULT_SIZES.iter().copied().map(GarmentSize).collect()
}

impl GarmentSize {
    pub fn new(value: u32) -> Result<Self, PriceListError> {
        if value == 0 {
            return Err(PriceListError::InvalidSize(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn parse(raw: &str) -> Result<Self, PriceListError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PriceListError::InvalidSize(raw.to_string()));
        }
        let value: u32 = trimmed
            .parse()
            .map_err(|_| PriceListError::InvalidSize(raw.to_string()))?;
        GarmentSize::new(value).map_err(|_| PriceListError::InvalidSize(raw.to_string()))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for GarmentSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-negative decimal kept as the text the user typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rate(String);

impl Rate {
    pub fn parse(raw: &str) -> Result<Self, PriceListError> {
        let trimmed = raw.trim();
        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (trimmed, None),
        };
        let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !digits(whole) || fraction.is_some_and(|part| !digits(part)) {
            return Err(PriceListError::InvalidRate(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn value(&self) -> f64 {
        self.0.parse().unwrap_or(0.0)
    }
}

impl Default for Rate {
    fn default() -> Self {
        Self(DEFAULT_RATE.to_string())
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeRate {
    pub size: GarmentSize,
    pub rate: Rate,
}

impl SizeRate {
    pub fn new(size: GarmentSize) -> Self {
        Self {
            size,
            rate: Rate::default(),
        }
    }
}

/// Two-row (size, rate) table. Duplicate sizes are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeRateTable {
    columns: Vec<SizeRate>,
}

impl SizeRateTable {
    pub fn with_sizes(sizes: &[GarmentSize]) -> Self {
        Self {
            columns: sizes.iter().copied().map(SizeRate::new).collect(),
        }
    }

    pub fn columns(&self) -> &[SizeRate] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn sizes(&self) -> impl Iterator<Item = GarmentSize> + '_ {
        self.columns.iter().map(|column| column.size)
    }

    /// Appends the next size after the current largest, or the first size when empty.
    pub fn add_size(&mut self) -> GarmentSize {
        let next = self
            .sizes()
            .map(GarmentSize::get)
            .max()
            .map(|max| max.saturating_add(SIZE_STEP))
            .unwrap_or(FIRST_SIZE);
        let size = GarmentSize(next);
        self.columns.push(SizeRate::new(size));
        size
    }

    pub fn remove_size(&mut self) -> Option<SizeRate> {
        self.columns.pop()
    }

    pub fn set_size(&mut self, column: usize, raw: &str) -> Result<(), PriceListError> {
        let size = GarmentSize::parse(raw)?;
        self.column_mut(column)?.size = size;
        Ok(())
    }

    pub fn set_rate(&mut self, column: usize, raw: &str) -> Result<(), PriceListError> {
        let rate = Rate::parse(raw)?;
        self.column_mut(column)?.rate = rate;
        Ok(())
    }

    fn column_mut(&mut self, column: usize) -> Result<&mut SizeRate, PriceListError> {
        let columns = self.columns.len();
        self.columns
            .get_mut(column)
            .ok_or(PriceListError::ColumnOutOfRange { column, columns })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeNode {
    id: TypeNodeId,
    name: String,
    ordinal: String,
    table: SizeRateTable,
}

impl TypeNode {
    pub(crate) fn new(id: TypeNodeId, name: impl Into<String>, sizes: &[GarmentSize]) -> Self {
        Self {
            id,
            name: name.into(),
            ordinal: String::new(),
            table: SizeRateTable::with_sizes(sizes),
        }
    }

    pub fn id(&self) -> TypeNodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ordinal(&self) -> &str {
        &self.ordinal
    }

    pub fn table(&self) -> &SizeRateTable {
        &self.table
    }

    pub fn display_name(&self) -> &str {
        name_or(&self.name, UNTITLED_TYPE)
    }

    pub(crate) fn set_ordinal(&mut self, ordinal: String) {
        self.ordinal = ordinal;
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) -> Change {
        self.name = name.into();
        Change::Edited
    }

    pub(crate) fn add_size(&mut self) -> (GarmentSize, Change) {
        (self.table.add_size(), Change::Edited)
    }

    pub(crate) fn remove_size(&mut self) -> Option<Change> {
        self.table.remove_size().map(|_| Change::Edited)
    }

    pub(crate) fn set_size(&mut self, column: usize, raw: &str) -> Result<Change, PriceListError> {
        self.table.set_size(column, raw)?;
        Ok(Change::Edited)
    }

    pub(crate) fn set_rate(&mut self, column: usize, raw: &str) -> Result<Change, PriceListError> {
        self.table.set_rate(column, raw)?;
        Ok(Change::Edited)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClothNode {
    id: ClothId,
    name: String,
    ordinal: String,
    types: Vec<TypeNode>,
}

impl ClothNode {
    pub(crate) fn new(id: ClothId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ordinal: String::new(),
            types: Vec::new(),
        }
    }

    pub fn id(&self) -> ClothId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ordinal(&self) -> &str {
        &self.ordinal
    }

    pub fn types(&self) -> &[TypeNode] {
        &self.types
    }

    pub fn display_name(&self) -> &str {
        name_or(&self.name, UNTITLED_CLOTH)
    }

    /// This cloth followed by all of its types.
    pub fn subtree_keys(&self) -> Vec<NodeKey> {
        let mut keys = vec![NodeKey::Cloth(self.id)];
        keys.extend(self.types.iter().map(|node| NodeKey::Type(node.id)));
        keys
    }

    pub fn find_type(&self, id: TypeNodeId) -> Option<&TypeNode> {
        self.types.iter().find(|node| node.id == id)
    }

    pub(crate) fn types_mut(&mut self) -> &mut [TypeNode] {
        &mut self.types
    }

    pub(crate) fn set_ordinal(&mut self, ordinal: String) {
        self.ordinal = ordinal;
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) -> Change {
        self.name = name.into();
        Change::Edited
    }

    pub(crate) fn find_type_mut(&mut self, id: TypeNodeId) -> Option<&mut TypeNode> {
        self.types.iter_mut().find(|node| node.id == id)
    }

    pub(crate) fn push_type(&mut self, node: TypeNode) -> Change {
        self.types.push(node);
        Change::Structural
    }

    pub(crate) fn remove_type(&mut self, id: TypeNodeId) -> Option<(TypeNode, Change)> {
        let index = self.types.iter().position(|node| node.id == id)?;
        Some((self.types.remove(index), Change::Structural))
    }

    pub(crate) fn move_type(&mut self, id: TypeNodeId, to: usize) -> Option<Change> {
        move_within(&mut self.types, |node| node.id == id, to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceListNode {
    id: PriceListId,
    name: String,
    ordinal: String,
    cloths: Vec<ClothNode>,
}

impl PriceListNode {
    pub(crate) fn new(id: PriceListId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ordinal: String::new(),
            cloths: Vec::new(),
        }
    }

    pub fn id(&self) -> PriceListId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ordinal(&self) -> &str {
        &self.ordinal
    }

    pub fn cloths(&self) -> &[ClothNode] {
        &self.cloths
    }

    pub fn display_name(&self) -> &str {
        name_or(&self.name, UNTITLED_PRICE_LIST)
    }

    pub fn subtree_keys(&self) -> Vec<NodeKey> {
        let mut keys = vec![NodeKey::PriceList(self.id)];
        for cloth in &self.cloths {
            keys.extend(cloth.subtree_keys());
        }
        keys
    }

    pub fn find_cloth(&self, id: ClothId) -> Option<&ClothNode> {
        self.cloths.iter().find(|node| node.id == id)
    }

    pub(crate) fn cloths_mut(&mut self) -> &mut [ClothNode] {
        &mut self.cloths
    }

    pub(crate) fn set_ordinal(&mut self, ordinal: String) {
        self.ordinal = ordinal;
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) -> Change {
        self.name = name.into();
        Change::Edited
    }

    pub(crate) fn find_cloth_mut(&mut self, id: ClothId) -> Option<&mut ClothNode> {
        self.cloths.iter_mut().find(|node| node.id == id)
    }

    pub(crate) fn push_cloth(&mut self, node: ClothNode) -> Change {
        self.cloths.push(node);
        Change::Structural
    }

    pub(crate) fn remove_cloth(&mut self, id: ClothId) -> Option<(ClothNode, Change)> {
        let index = self.cloths.iter().position(|node| node.id == id)?;
        Some((self.cloths.remove(index), Change::Structural))
    }

    pub(crate) fn move_cloth(&mut self, id: ClothId, to: usize) -> Option<Change> {
        move_within(&mut self.cloths, |node| node.id == id, to)
    }
}

// Moves the matching element to index `to` (clamped to the last slot).
pub(crate) fn move_within<T>(
    items: &mut Vec<T>,
    matches: impl Fn(&T) -> bool,
    to: usize,
) -> Option<Change> {
    let from = items.iter().position(matches)?;
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
    Some(Change::Structural)
}
