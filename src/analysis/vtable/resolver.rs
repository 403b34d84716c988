//! Dispatch table construction and lookup.
//!
//! [`VTableResolver::build`] partitions every method visible on a type into [`Slot`]s in
//! three ordered passes:
//!
//! 1. **Hiding chains**: walking from the queried type (depth 0) towards the root, each
//!    method that is not yet indexed opens a slot and pulls in every less derived method it
//!    implicitly overrides by name and signature.
//! 2. **Explicit overrides**: `MethodImpl` edges between class methods merge the overridden
//!    slot into the overriding one. Edges are processed most derived first and re-validated
//!    before every merge, so stale or inverted edges are skipped instead of corrupting the
//!    partition.
//! 3. **Interfaces**: explicit interface overrides and name/signature matches map every
//!    reachable interface method onto the entry that implements it.
//!
//! The finished table is immutable and can be shared between threads.

use std::{cmp::Reverse, collections::BinaryHeap};

use log::{debug, trace};
use rustc_hash::{FxHashMap, FxHashSet};
use strum::{Display, EnumCount, EnumIter};

use crate::{
    analysis::vtable::{
        config::ResolverConfig,
        slot::{EntryId, Slot, SlotEntry, SlotId},
    },
    metadata::{token::Token, typesystem::TypeModel},
    Error, Result,
};

/// Reason an explicit override edge was not applied during override resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter)]
pub enum OverrideSkip {
    /// The overridden method is declared on an interface; mapped with the interfaces
    #[strum(serialize = "interface target")]
    InterfaceTarget,
    /// The overridden method is not visible in this hierarchy
    #[strum(serialize = "target not indexed")]
    NotIndexed,
    /// Both methods already share a slot
    #[strum(serialize = "already unified")]
    SameSlot,
    /// The overridden chain no longer leads its slot
    #[strum(serialize = "target slot relocated")]
    Relocated,
    /// The overridden chain is more derived than the overriding method
    #[strum(serialize = "depth inversion")]
    DepthInversion,
    /// A hiding chain link overrides a chain rooted at the queried type
    #[strum(serialize = "chain link into root slot")]
    RootFromChainLink,
}

/// Statistics about a built dispatch table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VTableStats {
    /// Number of published slots
    pub slots: usize,
    /// Number of slot entries (one per class method, plus default interface methods)
    pub entries: usize,
    /// Number of interface methods mapped onto an entry
    pub interface_methods: usize,
    /// Number of slots absorbed by explicit overrides
    pub merged_slots: usize,
    /// Explicit override edges that were not applied
    pub skipped_overrides: usize,
    /// Deepest hierarchy level visited (0 for a type without a base)
    pub max_depth: usize,
    /// Number of entries in the largest slot
    pub largest_slot: usize,
}

/// The dispatch table of one type.
///
/// Maps every method declared on the type or one of its ancestors, and every interface
/// method the type implements, to the [`SlotEntry`] it belongs to. The main method of that
/// entry's slot is the method that runs when any member of the slot is called on an instance
/// of the type.
///
/// # Examples
///
/// ```rust
/// use dotvtable::metadata::typesystem::{MethodBuilder, TypeBuilder, TypeRegistry};
/// use dotvtable::VTableResolver;
///
/// let registry = TypeRegistry::new();
/// let shape = TypeBuilder::class("Shape")
///     .method(MethodBuilder::new("Draw").virtual_().new_slot())
///     .build(&registry)?;
/// let circle = TypeBuilder::class("Circle")
///     .extends(shape.token)
///     .method(MethodBuilder::new("Draw").virtual_())
///     .build(&registry)?;
///
/// let vtable = VTableResolver::build(&registry, circle.token)?;
/// assert_eq!(vtable.dispatch_target(shape.methods[0])?, circle.methods[0]);
/// # Ok::<(), dotvtable::Error>(())
/// ```
#[derive(Debug)]
pub struct VTableResolver {
    ty: Token,
    entries: Vec<SlotEntry>,
    slots: Vec<Slot>,
    method_index: FxHashMap<Token, EntryId>,
    max_depth: usize,
    merged_slots: usize,
    skipped_overrides: [usize; OverrideSkip::COUNT],
}

impl VTableResolver {
    /// Build the dispatch table of `ty` with the default [`ResolverConfig`]
    ///
    /// ## Arguments
    /// * 'model' - The type hierarchy to read
    /// * 'ty'    - The type to build the table for
    ///
    /// # Errors
    /// See [`VTableResolver::build_with_config`]
    pub fn build<M: TypeModel + ?Sized>(model: &M, ty: Token) -> Result<Self> {
        Self::build_with_config(model, ty, &ResolverConfig::default())
    }

    /// Build the dispatch table of `ty`
    ///
    /// ## Arguments
    /// * 'model'  - The type hierarchy to read
    /// * 'ty'     - The type to build the table for
    /// * 'config' - Limits and interface rules to apply
    ///
    /// # Errors
    /// - [`Error::TypeNotFound`] if `ty` is unknown to `model`
    /// - [`Error::InconsistentMetadata`] if a reachable interface method has no
    ///   implementation, or the base type or interface graph is cyclic
    /// - [`Error::InconsistentChain`] if two hiding chains claim the same method
    /// - [`Error::RecursionLimit`] if the hierarchy is deeper than
    ///   [`ResolverConfig::max_hierarchy_depth`]
    pub fn build_with_config<M: TypeModel + ?Sized>(
        model: &M,
        ty: Token,
        config: &ResolverConfig,
    ) -> Result<Self> {
        let hierarchy = collect_hierarchy(model, ty, config)?;

        let mut builder = TableBuilder::new(model, config, ty, hierarchy);
        builder.create_slots()?;
        builder.resolve_overrides();
        builder.map_interfaces()?;

        Ok(builder.finish())
    }

    /// The type this table was built for
    #[must_use]
    pub fn type_token(&self) -> Token {
        self.ty
    }

    /// The entry `method` belongs to, or `None` if it is not visible on this type
    #[must_use]
    pub fn entry(&self, method: Token) -> Option<&SlotEntry> {
        self.method_index.get(&method).map(|id| &self.entries[id.0])
    }

    /// Index of the entry `method` belongs to
    #[must_use]
    pub fn entry_id(&self, method: Token) -> Option<EntryId> {
        self.method_index.get(&method).copied()
    }

    /// The entry with the given index
    #[must_use]
    pub fn entry_at(&self, id: EntryId) -> Option<&SlotEntry> {
        self.entries.get(id.0)
    }

    /// All entries, in creation order
    #[must_use]
    pub fn entries(&self) -> &[SlotEntry] {
        &self.entries
    }

    /// The slot with the given index
    #[must_use]
    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slots.get(id.0)
    }

    /// The slot `method` belongs to
    #[must_use]
    pub fn slot_of(&self, method: Token) -> Option<&Slot> {
        self.entry(method).map(|entry| &self.slots[entry.slot.0])
    }

    /// All published slots; [`SlotId`] `n` is the `n`-th item
    pub fn slots(&self) -> std::slice::Iter<'_, Slot> {
        self.slots.iter()
    }

    /// Number of published slots
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// The entry whose method runs for every member of `slot`
    #[must_use]
    pub fn main_entry(&self, slot: &Slot) -> &SlotEntry {
        &self.entries[slot.main_method.0]
    }

    /// The method that runs when `method` is called on an instance of this type
    ///
    /// # Errors
    /// Returns [`Error::MethodNotFound`] if `method` is not visible on this type
    pub fn dispatch_target(&self, method: Token) -> Result<Token> {
        let slot = self
            .slot_of(method)
            .ok_or(Error::MethodNotFound(method))?;
        Ok(self.main_entry(slot).method)
    }

    /// Returns true if `method` is the main method of its slot
    #[must_use]
    pub fn is_dispatch_target(&self, method: Token) -> bool {
        match self.entry_id(method) {
            Some(id) => {
                self.entries[id.0].method == method
                    && self.slots[self.entries[id.0].slot.0].main_method == id
            }
            None => false,
        }
    }

    /// Returns true if `method` is visible on this type
    #[must_use]
    pub fn contains(&self, method: Token) -> bool {
        self.method_index.contains_key(&method)
    }

    /// Follows `super_method` links to the most derived entry of the hiding chain
    #[must_use]
    pub fn top_method(&self, id: EntryId) -> EntryId {
        top_of(&self.entries, id)
    }

    /// Follows `base_method` links to the least derived entry of the hiding chain
    #[must_use]
    pub fn bottom_method(&self, id: EntryId) -> EntryId {
        let mut current = id;
        while let Some(base) = self.entries[current.0].base_method {
            current = base;
        }
        current
    }

    /// Every class and interface method that shares the dispatch identity of `method`.
    ///
    /// Renaming or removing any of them requires doing the same to all others. Returns an
    /// empty list if `method` is not visible on this type.
    #[must_use]
    pub fn group(&self, method: Token) -> Vec<Token> {
        let Some(slot) = self.slot_of(method) else {
            return Vec::new();
        };

        let mut group = Vec::with_capacity(slot.len());
        for id in &slot.entries {
            let entry = &self.entries[id.0];
            group.push(entry.method);
            group.extend_from_slice(&entry.interface_methods);
        }
        group
    }

    /// The deepest hierarchy level visited, 0 for a type without a base
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of override edges skipped for `reason`
    #[must_use]
    pub fn skipped_overrides(&self, reason: OverrideSkip) -> usize {
        self.skipped_overrides[reason as usize]
    }

    /// Get statistics about this table
    #[must_use]
    pub fn stats(&self) -> VTableStats {
        VTableStats {
            slots: self.slots.len(),
            entries: self.entries.len(),
            interface_methods: self
                .entries
                .iter()
                .map(|entry| entry.interface_methods.len())
                .sum(),
            merged_slots: self.merged_slots,
            skipped_overrides: self.skipped_overrides.iter().sum(),
            max_depth: self.max_depth,
            largest_slot: self.slots.iter().map(Slot::len).max().unwrap_or(0),
        }
    }
}

fn top_of(entries: &[SlotEntry], id: EntryId) -> EntryId {
    let mut current = id;
    while let Some(derived) = entries[current.0].super_method {
        current = derived;
    }
    current
}

/// Walks from `ty` to the hierarchy root, index `n` holding the type at depth `n`
fn collect_hierarchy<M: TypeModel + ?Sized>(
    model: &M,
    ty: Token,
    config: &ResolverConfig,
) -> Result<Vec<Token>> {
    if !model.contains_type(ty) {
        return Err(Error::TypeNotFound(ty));
    }

    let mut hierarchy = vec![ty];
    let mut visited = FxHashSet::default();
    visited.insert(ty);

    let mut current = model.base_type(ty);
    while let Some(base) = current {
        if !visited.insert(base) {
            return Err(Error::InconsistentMetadata {
                ty,
                method: None,
                message: format!("base type chain loops back to {base}"),
            });
        }
        if hierarchy.len() >= config.max_hierarchy_depth {
            return Err(Error::RecursionLimit(config.max_hierarchy_depth));
        }

        hierarchy.push(base);
        current = model.base_type(base);
    }

    Ok(hierarchy)
}

/// Mutable state of one table build
struct TableBuilder<'a, M: TypeModel + ?Sized> {
    model: &'a M,
    config: &'a ResolverConfig,
    ty: Token,
    hierarchy: Vec<Token>,
    entries: Vec<SlotEntry>,
    /// `None` once absorbed by another slot, until pruned
    slots: Vec<Option<Slot>>,
    method_index: FxHashMap<Token, EntryId>,
    max_depth: usize,
    merged_slots: usize,
    skipped_overrides: [usize; OverrideSkip::COUNT],
}

impl<'a, M: TypeModel + ?Sized> TableBuilder<'a, M> {
    fn new(model: &'a M, config: &'a ResolverConfig, ty: Token, hierarchy: Vec<Token>) -> Self {
        TableBuilder {
            model,
            config,
            ty,
            hierarchy,
            entries: Vec::new(),
            slots: Vec::new(),
            method_index: FxHashMap::default(),
            max_depth: 0,
            merged_slots: 0,
            skipped_overrides: [0; OverrideSkip::COUNT],
        }
    }

    fn create_slots(&mut self) -> Result<()> {
        for depth in 0..self.hierarchy.len() {
            let level = self.hierarchy[depth];
            for method in self.model.methods(level) {
                if self.method_index.contains_key(&method) {
                    continue;
                }

                let chain = self.hiding_chain(method, depth)?;
                self.add_chain(&chain)?;
            }
        }
        self.max_depth = self.hierarchy.len().saturating_sub(1);

        trace!(
            "{}: {} slots from {} levels",
            self.ty,
            self.slots.len(),
            self.hierarchy.len()
        );
        Ok(())
    }

    /// `method` followed by every method it hides, each with its depth
    fn hiding_chain(&self, method: Token, depth: usize) -> Result<Vec<(Token, usize)>> {
        let mut chain = vec![(method, depth)];
        let (mut current, mut level) = (method, depth);

        loop {
            let mut next_level = level;
            let Some(base) = self.model.next_hidden_base(current, &mut next_level) else {
                break;
            };

            if next_level <= level || next_level >= self.hierarchy.len() {
                return Err(Error::InconsistentChain {
                    method: base,
                    message: format!(
                        "hidden by {current} at depth {level} but reported at depth {next_level}"
                    ),
                });
            }

            chain.push((base, next_level));
            current = base;
            level = next_level;
        }

        Ok(chain)
    }

    /// Opens a slot holding `chain`, linked from most to least derived
    fn add_chain(&mut self, chain: &[(Token, usize)]) -> Result<SlotId> {
        for &(method, _) in chain {
            if let Some(existing) = self.method_index.get(&method) {
                return Err(Error::InconsistentChain {
                    method,
                    message: format!(
                        "already attached to slot {}",
                        self.entries[existing.0].slot
                    ),
                });
            }
        }

        let slot_id = SlotId(self.slots.len());
        let mut slot = Slot::new(EntryId(self.entries.len()));
        let mut previous: Option<EntryId> = None;

        for &(method, depth) in chain {
            let id = EntryId(self.entries.len());
            let mut entry = SlotEntry::new(method, depth, slot_id);
            entry.super_method = previous;
            if let Some(derived) = previous {
                self.entries[derived.0].base_method = Some(id);
            }

            self.entries.push(entry);
            self.method_index.insert(method, id);
            slot.entries.push(id);
            previous = Some(id);
        }

        self.slots.push(Some(slot));
        Ok(slot_id)
    }

    fn overrides_interface(&self, method: Token) -> bool {
        self.model
            .method_owner(method)
            .is_some_and(|owner| self.model.is_interface(owner))
    }

    fn resolve_overrides(&mut self) {
        // most derived first, then declaration order
        let mut worklist = BinaryHeap::new();
        for depth in 0..self.hierarchy.len() {
            let level = self.hierarchy[depth];
            for (order, method) in self.model.methods(level).into_iter().enumerate() {
                let has_class_target = self
                    .model
                    .method_overrides(method)
                    .into_iter()
                    .any(|overridden| !self.overrides_interface(overridden));
                if !has_class_target {
                    continue;
                }

                if let Some(&id) = self.method_index.get(&method) {
                    worklist.push(Reverse((self.entries[id.0].depth, order, id)));
                }
            }
        }

        while let Some(Reverse((_, _, id))) = worklist.pop() {
            let method = self.entries[id.0].method;
            for overridden in self.model.method_overrides(method) {
                match self.check_override(id, overridden) {
                    Ok(target) => {
                        let absorber = self.entries[id.0].slot;
                        self.merge(absorber, target);
                    }
                    Err(reason) => {
                        self.skipped_overrides[reason as usize] += 1;
                        if reason != OverrideSkip::InterfaceTarget {
                            debug!("{}: skipping override {method} -> {overridden}: {reason}", self.ty);
                        }
                    }
                }
            }
        }

        self.prune();
        trace!(
            "{}: {} slots after merging {}",
            self.ty,
            self.slots.len(),
            self.merged_slots
        );
    }

    /// The slot to absorb for the edge `id` -> `overridden`, or why the edge does not apply
    fn check_override(
        &self,
        id: EntryId,
        overridden: Token,
    ) -> std::result::Result<SlotId, OverrideSkip> {
        if self.overrides_interface(overridden) {
            return Err(OverrideSkip::InterfaceTarget);
        }

        let Some(&target_entry) = self.method_index.get(&overridden) else {
            return Err(OverrideSkip::NotIndexed);
        };

        let entry = &self.entries[id.0];
        let target = self.entries[target_entry.0].slot;
        if target == entry.slot {
            return Err(OverrideSkip::SameSlot);
        }

        let top = top_of(&self.entries, target_entry);
        match &self.slots[target.0] {
            Some(slot) if slot.main_method == top => {}
            _ => return Err(OverrideSkip::Relocated),
        }

        let top_depth = self.entries[top.0].depth;
        if top_depth < entry.depth {
            return Err(OverrideSkip::DepthInversion);
        }

        // a chain link always sits below depth 0, so the depth check above already rejects
        // this. TODO: drop once merged tables have been compared against runtime layouts
        if entry.super_method.is_some() && top_depth == 0 {
            return Err(OverrideSkip::RootFromChainLink);
        }

        Ok(target)
    }

    /// Moves every entry of `absorbed` into `absorber`, keeping the absorber's main method
    fn merge(&mut self, absorber: SlotId, absorbed: SlotId) {
        if absorber == absorbed || self.slots[absorber.0].is_none() {
            return;
        }
        let Some(moved) = self.slots[absorbed.0].take() else {
            return;
        };

        for id in &moved.entries {
            self.entries[id.0].slot = absorber;
        }
        if let Some(slot) = self.slots[absorber.0].as_mut() {
            slot.entries.extend(moved.entries);
        }
        self.merged_slots += 1;
    }

    /// Drops absorbed slots and renumbers the rest
    fn prune(&mut self) {
        let mut remap = vec![None; self.slots.len()];
        let mut live = Vec::with_capacity(self.slots.len());

        for (index, slot) in self.slots.drain(..).enumerate() {
            if let Some(slot) = slot {
                remap[index] = Some(SlotId(live.len()));
                live.push(Some(slot));
            }
        }

        for entry in &mut self.entries {
            if let Some(id) = remap[entry.slot.0] {
                entry.slot = id;
            }
        }
        self.slots = live;
    }

    fn map_interfaces(&mut self) -> Result<()> {
        let reachable = self.reachable_interfaces()?;
        let is_interface = self.model.is_interface(self.ty);

        for depth in 0..self.hierarchy.len() {
            let level = self.hierarchy[depth];
            self.map_explicit(level);

            // interfaces do not implement their parents implicitly
            if !is_interface {
                for iface in self.model.interfaces(level) {
                    self.map_declared_interface(iface, depth);
                }
            }
        }

        self.close_interfaces(&reachable, is_interface)?;
        trace!(
            "{}: {} interfaces mapped, {} entries",
            self.ty,
            reachable.len(),
            self.entries.len()
        );
        Ok(())
    }

    /// Every interface listed anywhere in the hierarchy, with their parents, in first-seen order
    fn reachable_interfaces(&self) -> Result<Vec<Token>> {
        let mut order = Vec::new();
        let mut done = FxHashSet::default();
        let mut path = Vec::new();

        for &level in &self.hierarchy {
            for iface in self.model.interfaces(level) {
                self.visit_interface(iface, &mut path, &mut done, &mut order)?;
            }
        }
        Ok(order)
    }

    fn visit_interface(
        &self,
        iface: Token,
        path: &mut Vec<Token>,
        done: &mut FxHashSet<Token>,
        order: &mut Vec<Token>,
    ) -> Result<()> {
        if done.contains(&iface) {
            return Ok(());
        }
        if path.contains(&iface) {
            return Err(Error::InconsistentMetadata {
                ty: self.ty,
                method: None,
                message: format!("interface {iface} inherits from itself"),
            });
        }
        if path.len() >= self.config.max_hierarchy_depth {
            return Err(Error::RecursionLimit(self.config.max_hierarchy_depth));
        }

        order.push(iface);
        path.push(iface);
        for parent in self.model.interfaces(iface) {
            self.visit_interface(parent, path, done, order)?;
        }
        path.pop();
        done.insert(iface);
        Ok(())
    }

    /// Explicit interface overrides of methods declared directly on `level`
    fn map_explicit(&mut self, level: Token) {
        for method in self.model.methods(level) {
            let Some(&id) = self.method_index.get(&method) else {
                continue;
            };

            for overridden in self.model.method_overrides(method) {
                if self.overrides_interface(overridden)
                    && !self.method_index.contains_key(&overridden)
                {
                    self.index_interface_method(overridden, id);
                }
            }
        }
    }

    /// Maps `iface`, listed on the class at `depth`, then the interfaces it extends
    fn map_declared_interface(&mut self, iface: Token, depth: usize) {
        self.map_implicit(iface, depth);

        let mut visited = FxHashSet::default();
        visited.insert(iface);
        let mut pending = self.model.interfaces(iface);
        pending.reverse();

        while let Some(parent) = pending.pop() {
            if !visited.insert(parent) {
                continue;
            }

            // inherited interface methods may be implemented anywhere in the hierarchy
            self.map_implicit(parent, 0);

            let mut grandparents = self.model.interfaces(parent);
            grandparents.reverse();
            pending.extend(grandparents);
        }
    }

    /// Name and signature matches for the unmapped methods of `iface`, searching the class
    /// at `from_depth` and then its ancestors
    fn map_implicit(&mut self, iface: Token, from_depth: usize) {
        for method in self.model.methods(iface) {
            if self.model.method_is_static(method) || self.method_index.contains_key(&method) {
                continue;
            }

            let implementation = self.hierarchy[from_depth..]
                .iter()
                .find_map(|&level| self.model.find_implicit_match(level, method))
                .and_then(|found| self.method_index.get(&found).copied());

            if let Some(id) = implementation {
                self.index_interface_method(method, id);
            }
        }
    }

    fn index_interface_method(&mut self, method: Token, id: EntryId) {
        self.method_index.insert(method, id);
        self.entries[id.0].interface_methods.push(method);
    }

    /// Fails on any reachable interface method still unmapped, unless it can dispatch to
    /// its own body
    fn close_interfaces(&mut self, reachable: &[Token], is_interface: bool) -> Result<()> {
        let detached_depth = self.hierarchy.len();

        for &iface in reachable {
            for method in self.model.methods(iface) {
                if self.model.method_is_static(method) || self.method_index.contains_key(&method)
                {
                    continue;
                }

                let own_slot = is_interface
                    || (self.config.default_interface_methods
                        && !self.model.method_is_abstract(method));
                if !own_slot {
                    return Err(Error::InconsistentMetadata {
                        ty: self.ty,
                        method: Some(method),
                        message: format!("{method} of interface {iface} is not implemented"),
                    });
                }

                self.add_chain(&[(method, detached_depth)])?;
            }
        }

        Ok(())
    }

    fn finish(self) -> VTableResolver {
        VTableResolver {
            ty: self.ty,
            entries: self.entries,
            slots: self.slots.into_iter().flatten().collect(),
            method_index: self.method_index,
            max_depth: self.max_depth,
            merged_slots: self.merged_slots,
            skipped_overrides: self.skipped_overrides,
        }
    }
}
