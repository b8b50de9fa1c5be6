//! # Credential Resolution Store
//!
//! Owns the ordered collection of credential definitions and resolves
//! each assignment against everything assigned before it. The store
//! upholds one core property: after every completed [`assign`] call, no
//! address is covered by more than one definition. Later assignments win
//! by carving earlier ranges apart; the carved remainders keep their
//! original credentials.
//!
//! One historical quirk is kept on purpose: an assignment whose coverage
//! already sits entirely inside a segment of the definition it matches
//! (same identity attributes) is skipped outright, so secondary
//! attribute updates (`port`, `password`) riding on it are dropped too.
//! The earlier write wins for a fully covered region.
//!
//! [`assign`]: CredentialStore::assign

use credmap_common::network::addr::Addr;
use credmap_common::network::segment::Segment;
use tracing::{debug, warn};

use crate::credentials::{AssignError, AttributeMap, Definition, Protocol};

/// The credential resolver: a partition of assigned address space into
/// disjoint, credentialed segments.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    /// Attributes of the segment-less default definition, covering every
    /// address no other definition claims.
    default_attributes: AttributeMap,
    /// Address-bearing definitions, in creation order.
    definitions: Vec<Definition>,
    redundant_skips: usize,
}

impl CredentialStore {
    pub fn new(default_attributes: AttributeMap) -> Self {
        Self {
            default_attributes,
            definitions: Vec::new(),
            redundant_skips: 0,
        }
    }

    /// The final partition, in first-created-definition-first order.
    ///
    /// Definitions emptied by later overrides are already gone; each
    /// surviving definition lists its segments ascending by lower bound.
    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    /// Attributes of the default definition.
    pub fn default_attributes(&self) -> &AttributeMap {
        &self.default_attributes
    }

    /// Number of assignments skipped as already covered.
    pub fn redundant_skips(&self) -> usize {
        self.redundant_skips
    }

    /// Applies one credential assignment.
    ///
    /// * `begin = None` assigns to the default definition: only its
    ///   attributes are updated, no segment bookkeeping happens.
    /// * `end = None` assigns the single address `begin`.
    /// * Otherwise assigns the closed range `[begin, end]`.
    ///
    /// Validation happens before any mutation, so a failed call leaves
    /// the store exactly as it was.
    pub fn assign(
        &mut self,
        protocol: Protocol,
        begin: Option<Addr>,
        end: Option<Addr>,
        attributes: AttributeMap,
    ) -> Result<(), AssignError> {
        let Some(begin) = begin else {
            if let Some(end) = end {
                return Err(AssignError::InvalidRange {
                    reason: format!("end '{end}' given without a begin address"),
                });
            }
            debug!(protocol = %protocol, "updating default credential attributes");
            for (key, value) in attributes {
                self.default_attributes.insert(key, value);
            }
            return Ok(());
        };

        if let Some(end) = end {
            if end < begin {
                return Err(AssignError::InvalidRange {
                    reason: format!("end '{end}' is below begin '{begin}'"),
                });
            }
        }
        let segment = match end {
            Some(end) => Segment::range(begin, end),
            None => Segment::specific(begin),
        };

        // Step 1: find a reusable definition by identity attributes.
        let target: Option<usize> = self
            .definitions
            .iter()
            .position(|def| def.matches(protocol, &attributes));
        if let Some(index) = target {
            self.definitions[index].check_identity(&attributes)?;
        }

        // Step 2: an assignment entirely inside its own definition's
        // coverage is dropped, secondary attribute updates included.
        if let Some(covering) = self.find_covering(target, &segment) {
            warn!(
                new = %segment,
                covering = %covering,
                "assignment already covered, skipped"
            );
            self.redundant_skips += 1;
            return Ok(());
        }

        let target: usize = match target {
            Some(index) => index,
            None => {
                self.definitions.push(Definition::new(protocol));
                self.definitions.len() - 1
            }
        };

        // Steps 3-5: make room in every other definition, then drop the
        // ones that end up with nothing left.
        self.carve_ranges(target, &segment);
        self.prune_specifics(target, &segment);
        let target: usize = self.collect_empty(target);

        // Steps 6-7: claim the coverage and layer the attributes on.
        self.definitions[target].insert_segment(segment);
        self.definitions[target].apply_attributes(attributes);
        Ok(())
    }

    /// Finds a segment of the matched definition that fully covers
    /// `segment`, if any.
    ///
    /// The check is scoped to the matched definition: coverage by a
    /// definition with *different* identity attributes is an override
    /// request and goes through the carve path instead. A new range only
    /// counts as covered by an existing range; a new specific is covered
    /// by either kind.
    fn find_covering(&self, target: Option<usize>, segment: &Segment) -> Option<Segment> {
        let def: &Definition = &self.definitions[target?];
        def.segments()
            .iter()
            .find(|existing| {
                let covers =
                    existing.begin() <= segment.begin() && segment.end() <= existing.end();
                let comparable = match segment {
                    Segment::Specific(_) => true,
                    Segment::Range { .. } => matches!(existing, Segment::Range { .. }),
                };
                covers && comparable
            })
            .copied()
    }

    /// Splits every range of every other definition around `segment`.
    ///
    /// A remainder of a single address becomes a `Specific`; an empty
    /// remainder is never created. Remainders replace the carved range
    /// in place, so each definition's segment order is preserved.
    fn carve_ranges(&mut self, target: usize, segment: &Segment) {
        let begin: Addr = segment.begin();
        let end: Addr = segment.end();
        for (index, def) in self.definitions.iter_mut().enumerate() {
            if index == target {
                continue;
            }
            let old_segments: Vec<Segment> = std::mem::take(&mut def.segments);
            for old in old_segments {
                let is_range = matches!(old, Segment::Range { .. });
                if !(is_range && old.intersects(begin, end)) {
                    def.segments.push(old);
                    continue;
                }
                debug!(carved = %old, by = %segment, "carving range");
                // Room left of the new coverage.
                if let Some(cut) = begin.prev() {
                    if old.begin() <= cut {
                        def.segments.push(Segment::range(old.begin(), cut));
                    }
                }
                // Room right of the new coverage.
                if let Some(cut) = end.next() {
                    if cut <= old.end() {
                        def.segments.push(Segment::range(cut, old.end()));
                    }
                }
            }
        }
    }

    /// Removes specifics of other definitions superseded by `segment`.
    fn prune_specifics(&mut self, target: usize, segment: &Segment) {
        for (index, def) in self.definitions.iter_mut().enumerate() {
            if index == target {
                continue;
            }
            let removed = def.remove_segments(|old| {
                matches!(old, Segment::Specific(addr) if segment.contains(*addr))
            });
            for old in removed {
                debug!(pruned = %old, by = %segment, "pruning superseded specific");
            }
        }
    }

    /// Drops definitions left without segments, keeping `target` even
    /// while it is still empty. Returns the target's new index.
    fn collect_empty(&mut self, target: usize) -> usize {
        let mut index: usize = 0;
        let mut new_target: usize = target;
        self.definitions.retain(|def| {
            let keep = index == target || !def.segments().is_empty();
            if !keep {
                debug!(definition = %def.label(), "dropping emptied definition");
                if index < target {
                    new_target -= 1;
                }
            }
            index += 1;
            keep
        });
        new_target
    }
}
