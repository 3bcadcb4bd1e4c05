//! Topology diffing
//!
//! Compares two versions of a subspace using region equality, which ignores
//! replica membership. An equal region keeps its partition and target, so it
//! only needs a replica-set delta; anything else is a new announcement.

use super::{Space, Subspace};

/// How a region of the new subspace relates to the old one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionChange {
    /// Same partition and target as `old_index` in the old subspace
    Unchanged { old_index: usize },

    /// New partition cell or new target; must be announced in full
    Announced,
}

/// Result of diffing two subspaces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubspaceDiff {
    /// One entry per region of the new subspace, same order
    pub changes: Vec<RegionChange>,

    /// Old regions with no equal counterpart in the new subspace
    pub retired: usize,
}

impl SubspaceDiff {
    pub fn announced(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, RegionChange::Announced))
            .count()
    }

    pub fn unchanged(&self) -> usize {
        self.changes.len() - self.announced()
    }
}

/// Diff `new` against `old`
pub fn diff_subspace(old: &Subspace, new: &Subspace) -> SubspaceDiff {
    let mut matched = vec![false; old.regions().len()];
    let mut changes = Vec::with_capacity(new.regions().len());

    for region in new.regions() {
        let found = old
            .regions()
            .iter()
            .enumerate()
            .find(|(i, r)| !matched[*i] && *r == region)
            .map(|(i, _)| i);

        match found {
            Some(old_index) => {
                matched[old_index] = true;
                changes.push(RegionChange::Unchanged { old_index });
            }
            None => changes.push(RegionChange::Announced),
        }
    }

    let retired = matched.iter().filter(|m| !**m).count();
    SubspaceDiff { changes, retired }
}

/// Carry replica sets from `old` into `new` for every unchanged region
///
/// Subspaces are paired by position and only when they hash the same
/// dimensions. Announced regions keep whatever replicas they were built with.
/// Returns one diff per subspace of `new`; unpaired subspaces report every
/// region as announced.
pub fn inherit_replicas(old: &Space, new: &mut Space) -> Vec<SubspaceDiff> {
    let mut diffs = Vec::with_capacity(new.subspaces().len());

    for (i, subspace) in new.subspaces_mut().iter_mut().enumerate() {
        let paired = old.subspaces().get(i).filter(|o| o.same_dimensions(subspace));

        let diff = match paired {
            Some(old_subspace) => {
                let diff = diff_subspace(old_subspace, subspace);
                for (region, change) in subspace.regions_mut().iter_mut().zip(&diff.changes) {
                    if let RegionChange::Unchanged { old_index } = change {
                        region.replicas = old_subspace.regions()[*old_index].replicas.clone();
                    }
                }
                diff
            }
            None => SubspaceDiff {
                changes: vec![RegionChange::Announced; subspace.regions().len()],
                retired: 0,
            },
        };
        diffs.push(diff);
    }

    diffs
}
